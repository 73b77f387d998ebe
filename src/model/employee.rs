use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "Mayssa Ben Othmane",
        "department": "IT",
        "joining_date": "2025-04-15"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Mayssa Ben Othmane")]
    pub full_name: String,

    #[schema(example = "IT")]
    pub department: String,

    #[schema(example = "2025-04-15", value_type = String, format = "date")]
    pub joining_date: NaiveDate,
}
