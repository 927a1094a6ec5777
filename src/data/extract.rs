use super::model::MatchupRecord;
use super::parameter::Parameter;

/// `primary - secondary` for every qualifying (record, match) pair, in
/// record order then match order.
pub type DifferenceSeries = Vec<f64>;

/// Collect the differences of `parameter` between each primary record and
/// its matches from `secondary`.
///
/// A pair contributes when:
/// * the match's `source` equals `secondary`
/// * the parameter's field holds a number on the record
/// * the same field holds a number on the match
///
/// Every other pair is skipped. An unknown `parameter` key resolves to the
/// default parameter, so this never fails; no qualifying pair yields an
/// empty series.
pub fn extract(records: &[MatchupRecord], secondary: &str, parameter: &str) -> DifferenceSeries {
    let field = Parameter::resolve(parameter).field();

    records
        .iter()
        .flat_map(|rec| {
            rec.matches
                .iter()
                .filter(move |m| m.source == secondary)
                .filter_map(move |m| match (rec.value(field), m.value(field)) {
                    (Some(a), Some(b)) => Some(a - b),
                    _ => None,
                })
        })
        .collect()
}
