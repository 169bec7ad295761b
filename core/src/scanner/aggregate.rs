use std::collections::HashMap;

use portcat_common::error::ScanError;
use portcat_common::network::target::Target;
use portcat_common::report::{ProbeOutcome, ScanReport};

/// Puts outcomes back into target order.
///
/// Outcomes may arrive in any order. A target without an outcome means the
/// scheduler lost work, which is reported as [`ScanError::IncompleteReport`].
/// Should a target show up twice, the first outcome wins.
pub fn aggregate(
    outcomes: Vec<ProbeOutcome>,
    original_order: &[Target],
) -> Result<ScanReport, ScanError> {
    let mut by_target: HashMap<Target, ProbeOutcome> = HashMap::with_capacity(outcomes.len());
    for outcome in outcomes {
        by_target.entry(outcome.target).or_insert(outcome);
    }

    let ordered = original_order
        .iter()
        .map(|target| {
            by_target
                .remove(target)
                .ok_or(ScanError::IncompleteReport { target: *target })
        })
        .collect::<Result<Vec<ProbeOutcome>, ScanError>>()?;

    Ok(ScanReport::new(ordered))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
