//! # Commit Ordering and Checkpoint Scenarios
//!
//! The ordered commit must announce its steps in a fixed sequence, the
//! durable marker must survive the process that wrote it, and the score
//! must move only through the state-change notification.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use fc_03_chain_sync::checkpoint::FileCommitStepWriter;
    use fc_03_chain_sync::ports::inbound::{ChainSynchronizer, InputSource, SyncOutcome};
    use fc_03_chain_sync::ports::outbound::{ScoreUpdatingObserver, SyncHandlers};
    use fc_03_chain_sync::{ChainSyncService, CommitOperationStep};
    use shared_types::ChainScore;

    use crate::integration::fixtures::*;

    #[test]
    fn test_commit_steps_announced_in_order() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let recorder = StepRecorder::default();
        let service = ChainSyncService::new(
            state,
            SyncHandlers::noop().with_commit_step_observer(Box::new(recorder.clone())),
        );

        let mut peer = extend(&local[3], 2);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { .. }));

        assert_eq!(
            recorder.steps.lock().clone(),
            vec![
                CommitOperationStep::BlocksWritten,
                CommitOperationStep::StateWritten,
                CommitOperationStep::AllUpdated,
            ]
        );
    }

    #[test]
    fn test_rejected_attempt_announces_no_steps() {
        let local = seeded_chain(5);
        let state = setup_state(&local);
        let recorder = StepRecorder::default();
        let service = ChainSyncService::new(
            state,
            SyncHandlers::noop().with_commit_step_observer(Box::new(recorder.clone())),
        );

        // One fork block cannot beat the two local blocks it replaces.
        let mut peer = extend(&local[2], 1);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePull).unwrap();
        assert!(matches!(outcome, SyncOutcome::Aborted(_)));
        assert!(recorder.steps.lock().is_empty());
    }

    #[test]
    fn test_marker_file_records_completed_commit() {
        let dir = TempDir::new().unwrap();
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let service = ChainSyncService::new(
            state,
            SyncHandlers::noop()
                .with_commit_step_observer(Box::new(FileCommitStepWriter::new(dir.path()))),
        );

        let mut peer = extend(&local[3], 3);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { .. }));

        // A recovery pass opening the marker fresh sees the final step.
        let reader = FileCommitStepWriter::new(dir.path());
        assert_eq!(
            reader.read_step().unwrap(),
            Some(CommitOperationStep::AllUpdated)
        );
    }

    #[test]
    fn test_successive_attempts_restart_the_sequence() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let recorder = StepRecorder::default();
        let service = ChainSyncService::new(
            state.clone(),
            SyncHandlers::noop().with_commit_step_observer(Box::new(recorder.clone())),
        );

        let mut first = extend(&local[3], 2);
        service.synchronize(&mut first, InputSource::RemotePush).unwrap();
        let mut second = extend(&first[1], 2);
        service.synchronize(&mut second, InputSource::RemotePush).unwrap();

        assert_eq!(state.storage.view().chain_height(), 8);
        let steps = recorder.steps.lock().clone();
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0], steps[3]);
        assert_eq!(steps[2], CommitOperationStep::AllUpdated);
        assert_eq!(steps[5], CommitOperationStep::AllUpdated);
    }

    #[test]
    fn test_score_moves_only_through_state_change_notification() {
        let local = seeded_chain(4);
        let state = setup_state(&local);

        // Without the score-updating observer the holder never moves,
        // even for an adopted chain.
        let silent = ChainSyncService::new(state.clone(), SyncHandlers::noop());
        let mut peer = extend(&local[3], 2);
        let outcome = silent.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { .. }));
        assert_eq!(state.score.current(), ChainScore::default());

        // With it, the holder advances by exactly the reported delta.
        let wired = ChainSyncService::new(
            state.clone(),
            SyncHandlers::noop().with_state_change_observer(Box::new(
                ScoreUpdatingObserver::new(Arc::clone(&state.score)),
            )),
        );
        let tip = state.storage.view().load_block_element(6).unwrap();
        let mut more = extend(&tip, 2);
        let outcome = wired.synchronize(&mut more, InputSource::RemotePush).unwrap();
        let SyncOutcome::Continue { score_delta, .. } = outcome else {
            panic!("extension was rejected");
        };
        assert_eq!(state.score.current(), score_delta);
    }
}
