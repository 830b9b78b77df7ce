//! Folding finished commands back into the window state.

use fund_me_core::{CommandResult, ConnectOutcome, FundOutcome, FundingSession, PortError};

use crate::bridge::BridgeReply;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Success(String),
    Error(String),
}

/// Applies `reply` to `session` field by field.
///
/// Replies can arrive out of order when clicks overlap. A field only changes
/// when the command changed it relative to the snapshot it started from.
pub fn apply_reply(session: &mut FundingSession, reply: BridgeReply) -> Option<StatusLine> {
    let BridgeReply {
        started_from,
        session: finished,
        result,
    } = reply;
    if finished.account != started_from.account {
        session.account = finished.account;
    }
    if finished.button_label != started_from.button_label {
        session.button_label = finished.button_label;
    }
    status_for(&result)
}

pub fn status_for(result: &Result<CommandResult, PortError>) -> Option<StatusLine> {
    match result {
        Ok(CommandResult::Connect(ConnectOutcome::Connected(_))) => {
            Some(StatusLine::Success("Wallet connected".to_owned()))
        }
        Ok(CommandResult::Connect(ConnectOutcome::ProviderMissing))
        | Ok(CommandResult::Fund(FundOutcome::ProviderMissing)) => None,
        Ok(CommandResult::Fund(FundOutcome::Simulated(outcome))) => {
            Some(StatusLine::Success(format!(
                "Simulated fund() with {} ETH ({} wei) on chain {}",
                outcome.amount.input, outcome.amount.wei, outcome.chain.id
            )))
        }
        Err(PortError::UserRejected(_)) => {
            Some(StatusLine::Error("Request rejected in wallet".to_owned()))
        }
        Err(PortError::Reverted { reason, .. }) => {
            Some(StatusLine::Error(format!("Simulation reverted: {reason}")))
        }
        Err(e) => Some(StatusLine::Error(e.to_string())),
    }
}
