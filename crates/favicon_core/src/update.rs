use crate::state::summary_message;
use crate::{BatchState, Effect, Msg};

/// Pure update function: applies a message to the batch tally and returns any effects.
pub fn update(mut state: BatchState, msg: Msg) -> (BatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::JobDone { job_id, outcome } => {
            if !state.record(job_id, &outcome) {
                return (state, Vec::new());
            }
            // Completed work is always handed over, even after a cancel.
            let mut effects = vec![Effect::RecordOutcome { job_id, outcome }];
            if !state.is_cancelled() {
                effects.push(Effect::ReportProgress {
                    percent: state.progress_percent(),
                });
            }
            effects
        }
        Msg::CancelObserved => {
            if state.mark_cancelled() {
                vec![Effect::StopDispatch]
            } else {
                Vec::new()
            }
        }
        Msg::AllJobsFinished => {
            if !state.mark_finished() || state.is_cancelled() {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if let Some(message) = summary_message(&state.result()) {
                effects.push(Effect::ShowSummary { message });
            }
            effects.push(Effect::RefreshHost);
            effects
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
