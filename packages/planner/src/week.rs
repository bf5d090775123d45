//! Work-week plans: the same sheet parsed for Monday through Friday.

use crate::config::PlanConfig;
use crate::error::PlanResult;
use crate::parser::{ParsedPlan, PlanRequest, parse_plan};
use crate::sheet::RawSheet;
use chrono::{Datelike, Days, NaiveDate};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const WORK_DAYS: usize = 5;

/// One day of a week plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    /// `dd/MM/yyyy`
    pub label: String,
    pub plan: ParsedPlan,
}

/// Monday..Friday of the ISO week containing `anchor`.
pub fn work_week(anchor: NaiveDate) -> Vec<NaiveDate> {
    let monday = anchor
        .checked_sub_days(Days::new(u64::from(anchor.weekday().num_days_from_monday())))
        .unwrap_or(anchor);
    monday
        .iter_days()
        .take(WORK_DAYS)
        .collect()
}

/// Parse every working day of the anchor's week.
///
/// Days run concurrently on the blocking pool over the shared sheet and are
/// returned in date order.
pub async fn parse_week(
    sheet: Arc<RawSheet>,
    anchor: NaiveDate,
    shift: Option<String>,
    cfg: Arc<PlanConfig>,
) -> PlanResult<Vec<DayPlan>> {
    let tasks = work_week(anchor).into_iter().map(|date| {
        let sheet = Arc::clone(&sheet);
        let cfg = Arc::clone(&cfg);
        let request = PlanRequest {
            date: Some(date),
            shift: shift.clone(),
        };
        async move {
            let plan =
                tokio::task::spawn_blocking(move || parse_plan(&sheet, &request, &cfg)).await??;
            Ok::<_, crate::error::PlanError>(DayPlan {
                date,
                label: date_label(date),
                plan,
            })
        }
    });
    let days = try_join_all(tasks).await?;
    tracing::info!(
        week_of = %anchor,
        rows = days.iter().map(|d| d.plan.rows.len()).sum::<usize>(),
        "Parsed week plan"
    );
    Ok(days)
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/MM/yyyy - N° Turno`, or just the date without a shift.
pub fn day_label(date: NaiveDate, shift: Option<&str>) -> String {
    match shift.filter(|s| !s.is_empty()) {
        Some(s) => format!("{} - {}° Turno", date_label(date), s),
        None => date_label(date),
    }
}

/// `plano_<label>.<ext>` with the label lower-cased and made path-safe.
pub fn export_file_name(label: &str, ext: &str) -> String {
    let stem: String = label
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("plano_{}.{}", stem, ext.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-18 is a Sunday; its ISO week starts on the 12th
        assert_eq!(work_week(date(2026, 10, 18))[0], date(2026, 10, 12));
        let days = work_week(date(2026, 10, 21));
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2026, 10, 19));
        assert_eq!(days[4], date(2026, 10, 23));
    }

    #[test]
    fn week_crosses_month_end() {
        let days = work_week(date(2025, 10, 31));
        assert_eq!(days[0], date(2025, 10, 27));
        assert_eq!(days[4], date(2025, 10, 31));
        let days = work_week(date(2025, 12, 31));
        assert_eq!(days[4], date(2026, 1, 2));
    }

    #[test]
    fn labels_and_file_names() {
        let d = date(2025, 10, 23);
        assert_eq!(date_label(d), "23/10/2025");
        assert_eq!(day_label(d, Some("1")), "23/10/2025 - 1° Turno");
        assert_eq!(day_label(d, None), "23/10/2025");
        assert_eq!(
            export_file_name(&day_label(d, Some("2")), "xlsx"),
            "plano_23-10-2025_-_2°_turno.xlsx"
        );
        assert_eq!(export_file_name("Semana", ".csv"), "plano_semana.csv");
    }
}
