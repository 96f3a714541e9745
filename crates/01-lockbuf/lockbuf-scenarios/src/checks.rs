use std::collections::HashSet;

use lockbuf::{LockState, ViewId};

use crate::stats::ScenarioStats;

/// Externally observed run data for the verification helpers.
pub struct RunReport<'a> {
    pub seen_views: &'a [ViewId],
    pub final_state: LockState,
    pub transferred: bool,
}

pub type CheckResult = Result<(), String>;

fn verify_terminal(report: &RunReport<'_>) -> CheckResult {
    if !report.transferred {
        return Err("buffer never reported transferred".into());
    }
    if report.final_state != LockState::Transferred {
        return Err(format!(
            "final state {:?} (expected Transferred)",
            report.final_state
        ));
    }
    Ok(())
}

fn verify_distinct_views(report: &RunReport<'_>, expected: u32) -> CheckResult {
    if report.seen_views.len() as u32 != expected {
        return Err(format!(
            "observed {} view tokens (expected {})",
            report.seen_views.len(),
            expected
        ));
    }
    let distinct: HashSet<ViewId> = report.seen_views.iter().copied().collect();
    if distinct.len() != report.seen_views.len() {
        return Err("granted view tokens were not distinct".into());
    }
    Ok(())
}

fn verify_no_rejections(stats: &ScenarioStats) -> CheckResult {
    let rejections =
        stats.rejected_acquires + stats.rejected_unlocks + stats.rejected_transfers;
    if rejections != 0 {
        return Err(format!("{rejections} operations rejected (expected 0)"));
    }
    Ok(())
}

pub fn verify_reader_fanout(
    report: &RunReport<'_>,
    stats: &ScenarioStats,
    readers: u32,
    byte_len: u32,
) -> CheckResult {
    verify_terminal(report)?;
    verify_distinct_views(report, readers + 1)?;
    verify_no_rejections(stats)?;
    if stats.reads_granted != readers {
        return Err(format!(
            "granted {} read views (expected {})",
            stats.reads_granted, readers
        ));
    }
    if stats.writes_granted != 1 {
        return Err(format!(
            "granted {} write views (expected 1)",
            stats.writes_granted
        ));
    }
    if stats.unlocks != readers + 1 {
        return Err(format!(
            "performed {} unlocks (expected {})",
            stats.unlocks,
            readers + 1
        ));
    }
    if stats.transfers != 1 {
        return Err(format!(
            "performed {} transfers (expected 1)",
            stats.transfers
        ));
    }
    let expected_bytes = (readers + 2).wrapping_mul(byte_len);
    if stats.relocated_bytes != expected_bytes {
        return Err(format!(
            "relocated {} bytes (expected {})",
            stats.relocated_bytes, expected_bytes
        ));
    }
    Ok(())
}

pub fn verify_writer_cycle(
    report: &RunReport<'_>,
    stats: &ScenarioStats,
    cycles: u32,
    byte_len: u32,
) -> CheckResult {
    verify_terminal(report)?;
    verify_distinct_views(report, cycles)?;
    verify_no_rejections(stats)?;
    if stats.writes_granted != cycles {
        return Err(format!(
            "granted {} write views (expected {})",
            stats.writes_granted, cycles
        ));
    }
    if stats.reads_granted != 0 {
        return Err(format!(
            "granted {} read views (expected 0)",
            stats.reads_granted
        ));
    }
    if stats.unlocks != cycles {
        return Err(format!(
            "performed {} unlocks (expected {})",
            stats.unlocks, cycles
        ));
    }
    if stats.transfers != 1 {
        return Err(format!(
            "performed {} transfers (expected 1)",
            stats.transfers
        ));
    }
    let expected_bytes = (cycles + 1).wrapping_mul(byte_len);
    if stats.relocated_bytes != expected_bytes {
        return Err(format!(
            "relocated {} bytes (expected {})",
            stats.relocated_bytes, expected_bytes
        ));
    }
    Ok(())
}

pub fn verify_misuse_probe(
    report: &RunReport<'_>,
    stats: &ScenarioStats,
    rounds: u32,
    byte_len: u32,
) -> CheckResult {
    verify_terminal(report)?;
    verify_distinct_views(report, rounds * 2)?;
    if stats.reads_granted != rounds {
        return Err(format!(
            "granted {} read views (expected {})",
            stats.reads_granted, rounds
        ));
    }
    if stats.writes_granted != rounds {
        return Err(format!(
            "granted {} write views (expected {})",
            stats.writes_granted, rounds
        ));
    }
    if stats.unlocks != rounds * 2 {
        return Err(format!(
            "performed {} unlocks (expected {})",
            stats.unlocks,
            rounds * 2
        ));
    }
    if stats.transfers != 1 {
        return Err(format!(
            "performed {} transfers (expected 1)",
            stats.transfers
        ));
    }
    let expected_acquire_rejections = rounds * 3 + 1;
    if stats.rejected_acquires != expected_acquire_rejections {
        return Err(format!(
            "{} acquisitions rejected (expected {})",
            stats.rejected_acquires, expected_acquire_rejections
        ));
    }
    let expected_unlock_rejections = if rounds == 0 { 0 } else { rounds * 2 + 1 };
    if stats.rejected_unlocks != expected_unlock_rejections {
        return Err(format!(
            "{} unlocks rejected (expected {})",
            stats.rejected_unlocks, expected_unlock_rejections
        ));
    }
    let expected_transfer_rejections = rounds + 1;
    if stats.rejected_transfers != expected_transfer_rejections {
        return Err(format!(
            "{} transfers rejected (expected {})",
            stats.rejected_transfers, expected_transfer_rejections
        ));
    }
    let expected_bytes = (rounds * 2 + 1).wrapping_mul(byte_len);
    if stats.relocated_bytes != expected_bytes {
        return Err(format!(
            "relocated {} bytes (expected {})",
            stats.relocated_bytes, expected_bytes
        ));
    }
    Ok(())
}
