//! # Priority Scorer
//!
//! Pure ranking function for already-surfaced work. Scores never gate
//! visibility; they only order candidates. Every factor's numeric
//! contribution is exposed in the breakdown so the ranking is explainable in
//! the operator UI.

use serde::{Deserialize, Serialize};

use crate::models::TaskType;

/// The scoring families a unit of work falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Renewal,
    Strategic,
    Opportunity,
    Risk,
}

impl From<TaskType> for UnitType {
    fn from(task_type: TaskType) -> Self {
        match task_type {
            TaskType::Renewal => Self::Renewal,
            TaskType::StrategicReview | TaskType::Onboarding => Self::Strategic,
            TaskType::Opportunity | TaskType::FollowUp => Self::Opportunity,
            TaskType::RiskMitigation => Self::Risk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountPlan {
    Invest,
    Expand,
    Manage,
    Monitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Expert,
    Senior,
    Mid,
    Junior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStage {
    Overdue,
    Emergency,
    Critical,
    Standard,
}

/// Account and unit context feeding the score. All fields are optional;
/// missing context leaves the corresponding multiplier at 1.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreContext {
    pub days_until_deadline: Option<i64>,
    pub account_plan: Option<AccountPlan>,
    pub annual_recurring_revenue: Option<f64>,
    pub opportunity_score: Option<f64>,
    pub risk_score: Option<f64>,
    pub renewal_stage: Option<RenewalStage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorContext {
    pub experience: Option<ExperienceLevel>,
    pub current_assigned_count: u32,
}

/// Each factor with its numeric contribution, plus the rounded total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub stage_bonus: f64,
    pub arr_multiplier: f64,
    pub plan_multiplier: f64,
    pub experience_multiplier: f64,
    pub workload_penalty: f64,
    pub total: i64,
}

fn base_score(unit_type: UnitType, context: &ScoreContext) -> f64 {
    match unit_type {
        UnitType::Renewal => match context.days_until_deadline {
            Some(days) if days <= 1 => 100.0,
            Some(days) if days <= 7 => 85.0,
            Some(days) if days <= 15 => 70.0,
            Some(days) if days <= 30 => 55.0,
            Some(days) if days <= 60 => 40.0,
            Some(days) if days <= 90 => 25.0,
            _ => 0.0,
        },
        UnitType::Strategic => match context.account_plan {
            Some(AccountPlan::Invest) => 70.0,
            Some(AccountPlan::Expand) => 60.0,
            _ => 50.0,
        },
        UnitType::Opportunity => 50.0 + context.opportunity_score.unwrap_or(0.0) * 0.5,
        UnitType::Risk => 60.0 + context.risk_score.unwrap_or(0.0) * 0.6,
    }
}

fn arr_multiplier(context: &ScoreContext) -> f64 {
    match context.annual_recurring_revenue {
        Some(arr) if arr >= 150_000.0 => 2.0,
        Some(arr) if arr >= 100_000.0 => 1.5,
        _ => 1.0,
    }
}

fn plan_multiplier(context: &ScoreContext) -> f64 {
    match context.account_plan {
        Some(AccountPlan::Invest) => 1.5,
        Some(AccountPlan::Expand) => 1.3,
        Some(AccountPlan::Manage) => 1.0,
        Some(AccountPlan::Monitor) => 0.8,
        None => 1.0,
    }
}

fn experience_multiplier(operator: &OperatorContext) -> f64 {
    match operator.experience {
        Some(ExperienceLevel::Expert) => 1.2,
        Some(ExperienceLevel::Senior) => 1.1,
        Some(ExperienceLevel::Mid) => 1.0,
        Some(ExperienceLevel::Junior) => 0.9,
        None => 1.0,
    }
}

fn stage_bonus(unit_type: UnitType, context: &ScoreContext) -> f64 {
    if unit_type != UnitType::Renewal {
        return 0.0;
    }
    match context.renewal_stage {
        Some(RenewalStage::Overdue) => 20.0,
        Some(RenewalStage::Emergency) => 15.0,
        Some(RenewalStage::Critical) => 10.0,
        _ => 0.0,
    }
}

/// Compute the full score breakdown for one unit of work.
pub fn score(
    unit_type: UnitType,
    context: &ScoreContext,
    operator: &OperatorContext,
) -> ScoreBreakdown {
    let base = base_score(unit_type, context);
    let bonus = stage_bonus(unit_type, context);
    let arr = arr_multiplier(context);
    let plan = plan_multiplier(context);
    let experience = experience_multiplier(operator);
    let workload = -(f64::from(operator.current_assigned_count) * 2.0);

    let total = ((base + bonus) * arr * plan * experience + workload).round() as i64;

    ScoreBreakdown {
        base_score: base,
        stage_bonus: bonus,
        arr_multiplier: arr,
        plan_multiplier: plan,
        experience_multiplier: experience,
        workload_penalty: workload,
        total,
    }
}

/// A candidate with its computed breakdown, as returned by [`rank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredUnit<T> {
    pub unit: T,
    pub breakdown: ScoreBreakdown,
}

/// Rank candidates by descending score. The sort is stable: candidates with
/// equal scores keep their insertion order.
pub fn rank<T>(
    candidates: Vec<T>,
    mut score_of: impl FnMut(&T) -> ScoreBreakdown,
) -> Vec<ScoredUnit<T>> {
    let mut scored: Vec<ScoredUnit<T>> = candidates
        .into_iter()
        .map(|unit| {
            let breakdown = score_of(&unit);
            ScoredUnit { unit, breakdown }
        })
        .collect();
    scored.sort_by(|a, b| b.breakdown.total.cmp(&a.breakdown.total));
    scored
}
