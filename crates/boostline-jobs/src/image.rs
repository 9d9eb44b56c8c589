use crate::error::{JobError, JobResult};

/// Registry accounts hosting the built-in `xgboost` image, by region.
const XGBOOST_ACCOUNTS: &[(&str, &str)] = &[
    ("us-west-1", "632365934929"),
    ("us-west-2", "433757028032"),
    ("us-east-1", "811284229777"),
    ("us-east-2", "825641698319"),
    ("ap-northeast-1", "501404015308"),
    ("ap-northeast-2", "306986355934"),
    ("ap-south-1", "991648021394"),
    ("ap-southeast-1", "475088953585"),
    ("ap-southeast-2", "544295431143"),
    ("ca-central-1", "469771592824"),
    ("eu-central-1", "813361260812"),
    ("eu-west-1", "685385470294"),
    ("eu-west-2", "644912444149"),
];

/// Image URI of a built-in algorithm container in `region`.
pub fn builtin_image_uri(algorithm: &str, region: &str, tag: &str) -> JobResult<String> {
    let accounts = match algorithm {
        "xgboost" => XGBOOST_ACCOUNTS,
        other => {
            return Err(JobError::InvalidDescriptor(format!(
                "no built-in image known for algorithm '{other}'; set training_image explicitly"
            )));
        }
    };

    let account = accounts
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, account)| *account)
        .ok_or_else(|| {
            JobError::InvalidDescriptor(format!(
                "no built-in {algorithm} image for region '{region}'; set training_image explicitly"
            ))
        })?;

    Ok(format!("{account}.dkr.ecr.{region}.amazonaws.com/{algorithm}:{tag}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_region() {
        assert_eq!(
            builtin_image_uri("xgboost", "us-east-1", "1").unwrap(),
            "811284229777.dkr.ecr.us-east-1.amazonaws.com/xgboost:1"
        );
    }

    #[test]
    fn test_unknown_region_or_algorithm() {
        assert!(builtin_image_uri("xgboost", "mars-north-1", "1").is_err());
        assert!(builtin_image_uri("kmeans", "us-east-1", "1").is_err());
    }
}
