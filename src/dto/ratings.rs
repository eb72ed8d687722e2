use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct SubmitRatingRequest {
    #[validate(range(min = 1, max = 5, message = "Rating value must be an integer between 1 and 5"))]
    pub rating_value: i64,
}
