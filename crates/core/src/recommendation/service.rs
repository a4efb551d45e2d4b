use std::num::NonZeroUsize;
use std::thread;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::calculators::{default_calculators, ScoreCalculator};
use crate::recommendation::context::CalculationContext;
use crate::recommendation::result::{ComponentScores, RecommendationResult, ScoreDetail};
use crate::recommendation::ScoringParameters;

/// Below this many candidates the parallel entry point scores on the caller's thread.
const PARALLEL_THRESHOLD: usize = 64;

/// Scores candidate stores for one member. Holds no per-request state; results come
/// back one per input store, in input order.
pub struct RecommendationDomainService {
    calculators: Vec<Box<dyn ScoreCalculator>>,
    parameters: ScoringParameters,
}

impl Default for RecommendationDomainService {
    fn default() -> Self {
        Self::new(ScoringParameters::default())
    }
}

impl RecommendationDomainService {
    pub fn new(parameters: ScoringParameters) -> Self {
        Self { calculators: default_calculators(), parameters }
    }

    pub fn with_calculators(
        calculators: Vec<Box<dyn ScoreCalculator>>,
        parameters: ScoringParameters,
    ) -> Self {
        Self { calculators, parameters }
    }

    pub fn parameters(&self) -> &ScoringParameters {
        &self.parameters
    }

    /// Scores against today's local date.
    pub fn calculate_recommendations(
        &self,
        stores: &[Store],
        profile: &UserProfile,
    ) -> Vec<RecommendationResult> {
        self.calculate_recommendations_at(stores, profile, Local::now().date_naive())
    }

    pub fn calculate_recommendations_at(
        &self,
        stores: &[Store],
        profile: &UserProfile,
        as_of: NaiveDate,
    ) -> Vec<RecommendationResult> {
        let started = Instant::now();
        let context = self.context(stores, profile, as_of);
        let results: Vec<_> =
            stores.iter().map(|store| self.score_store(store, profile, &context)).collect();
        self.log_completed(profile, &results, started, 1);
        results
    }

    /// Same results as `calculate_recommendations_at`, with stores split across
    /// scoped worker threads.
    pub fn calculate_recommendations_parallel(
        &self,
        stores: &[Store],
        profile: &UserProfile,
        as_of: NaiveDate,
    ) -> Vec<RecommendationResult> {
        let workers = thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
        if workers <= 1 || stores.len() < PARALLEL_THRESHOLD {
            return self.calculate_recommendations_at(stores, profile, as_of);
        }

        let started = Instant::now();
        let context = self.context(stores, profile, as_of);
        let chunk_size = stores.len().div_ceil(workers);
        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = stores
                .chunks(chunk_size)
                .map(|chunk| {
                    let context = &context;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|store| self.score_store(store, profile, context))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });
        self.log_completed(profile, &results, started, workers);
        results
    }

    pub fn context(&self, stores: &[Store], profile: &UserProfile, as_of: NaiveDate) -> CalculationContext {
        CalculationContext::build(stores, profile, as_of, self.parameters)
    }

    pub fn score_store(
        &self,
        store: &Store,
        profile: &UserProfile,
        context: &CalculationContext,
    ) -> RecommendationResult {
        let mut raw = ComponentScores::default();
        for calculator in &self.calculators {
            raw.set(calculator.component(), calculator.calculate(store, profile, context));
        }

        let detail = ScoreDetail::assemble(profile.recommendation_type, raw);
        let distance = profile.location().distance_km(&store.location());
        debug!(
            event_name = "recommendation.store.scored",
            store_id = store.id.0,
            final_score = detail.final_score,
            distance_km = distance,
            "store scored"
        );
        RecommendationResult::from_store(store, distance, detail)
    }

    fn log_completed(
        &self,
        profile: &UserProfile,
        results: &[RecommendationResult],
        started: Instant,
        workers: usize,
    ) {
        info!(
            event_name = "recommendation.scoring.completed",
            member_id = profile.member_id.0,
            recommendation_type = profile.recommendation_type.as_str(),
            candidate_count = results.len(),
            workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recommendation scoring completed"
        );
    }
}
