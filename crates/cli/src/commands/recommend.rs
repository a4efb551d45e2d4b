use mealtable_app::{RecommendationRequest, SortBy, StoreTypeFilter};
use mealtable_core::domain::member::MemberId;
use rust_decimal::Decimal;

use crate::commands::{bootstrap, to_data, CommandResult, RuntimeOptions};

/// Request knobs accepted on the command line. Unset values fall back to configuration.
#[derive(Clone, Debug, Default)]
pub struct RecommendArgs {
    pub member_id: i64,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub radius_km: Option<f64>,
    pub sort_by: SortBy,
    pub include_disliked: bool,
    pub open_now: bool,
    pub store_type: StoreTypeFilter,
    pub page: u32,
    pub size: Option<u32>,
}

pub fn run(options: &RuntimeOptions, args: RecommendArgs) -> CommandResult {
    let runtime = match bootstrap("recommend", options) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let mut request = RecommendationRequest::with_defaults(&runtime.config.recommendation);
    request.latitude = args.latitude;
    request.longitude = args.longitude;
    if let Some(radius_km) = args.radius_km {
        request.radius_km = radius_km;
    }
    request.sort_by = args.sort_by;
    request.include_disliked = args.include_disliked;
    request.open_now = args.open_now;
    request.store_type = args.store_type;
    request.page = args.page;
    if let Some(size) = args.size {
        request.size = size;
    }
    request.at = options.at;

    let member_id = MemberId(args.member_id);
    match runtime.block_on(runtime.service.get_recommendations(member_id, &request)) {
        Ok(page) => CommandResult::success(
            "recommend",
            format!(
                "{} of {} stores within {} km for member {member_id} (sort {})",
                page.items.len(),
                page.total,
                request.radius_km,
                request.sort_by.as_str()
            ),
            to_data(&page),
        ),
        Err(error) => CommandResult::from_application_error("recommend", error),
    }
}
