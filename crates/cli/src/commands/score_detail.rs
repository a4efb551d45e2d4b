use mealtable_core::domain::member::MemberId;
use mealtable_core::domain::store::StoreId;
use rust_decimal::Decimal;

use crate::commands::{bootstrap, to_data, CommandResult, RuntimeOptions};

pub fn run(
    options: &RuntimeOptions,
    member_id: i64,
    store_id: i64,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
) -> CommandResult {
    let runtime = match bootstrap("score-detail", options) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let detail = runtime.block_on(runtime.service.get_score_detail(
        MemberId(member_id),
        StoreId(store_id),
        latitude,
        longitude,
    ));
    match detail {
        Ok(detail) => CommandResult::success(
            "score-detail",
            format!(
                "store {store_id} scores {:.2} for member {member_id} ({})",
                detail.final_score, detail.recommendation_type
            ),
            to_data(&detail),
        ),
        Err(error) => CommandResult::from_application_error("score-detail", error),
    }
}
