//! # Synchronization Flow Scenarios
//!
//! End-to-end adoption, reorg and rejection behavior with storage and
//! cache wired together. Difficulty checking and block execution use
//! the production implementations except where a scenario pins down a
//! single collaborator with a capture mock.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fc_03_chain_sync::domain::difficulty::DEFAULT_DIFFICULTY;
    use fc_03_chain_sync::ports::inbound::{ChainSynchronizer, InputSource, SyncOutcome};
    use fc_03_chain_sync::ports::outbound::{ScoreUpdatingObserver, SyncHandlers};
    use fc_03_chain_sync::processor::{
        derive_generation_hash, AlwaysHitPredicate, BlockChainProcessor, ObserverAggregate,
        RollingDifficultyChecker,
    };
    use fc_03_chain_sync::{
        ChainSyncService, SyncRejection, UndoMode, ValidationFailure,
    };
    use shared_types::ChainScore;

    use crate::integration::fixtures::*;

    /// Production wiring with eligibility vouched for by the fixture.
    fn production_handlers(state: &fc_03_chain_sync::LocalChainState) -> SyncHandlers {
        SyncHandlers::noop()
            .with_difficulty_checker(Box::new(RollingDifficultyChecker))
            .with_undo_observer(Box::new(ObserverAggregate::standard()))
            .with_batch_processor(Box::new(BlockChainProcessor::new(
                Box::new(AlwaysHitPredicate),
                ObserverAggregate::standard(),
            )))
            .with_state_change_observer(Box::new(ScoreUpdatingObserver::new(Arc::clone(
                &state.score,
            ))))
    }

    #[test]
    fn test_pure_extension_adopts_remote_blocks() {
        let local = seeded_chain(7);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state.clone(), production_handlers(&state));

        let mut peer = extend(&local[6], 4);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();

        let expected_delta = ChainScore::new(4 * (DEFAULT_DIFFICULTY - 15));
        assert_eq!(
            outcome,
            SyncOutcome::Continue {
                height: 11,
                score_delta: expected_delta,
            }
        );
        assert_eq!(state.storage.view().chain_height(), 11);
        assert_eq!(state.cache.height(), 11);
        assert_eq!(state.score.current(), expected_delta);
        // The difficulty history follows the adopted blocks.
        assert!(state.cache.read().difficulty_info(11).is_some());
    }

    #[test]
    fn test_reorg_undoes_blocks_top_down_then_common_once() {
        let local = seeded_chain(8);
        let state = setup_state(&local);
        let recorder = UndoRecorder::default();
        let service = ChainSyncService::new(
            state.clone(),
            SyncHandlers::noop().with_undo_observer(Box::new(recorder.clone())),
        );

        // Fork at height 4 with double difficulty: clearly better.
        let mut peer = extend_with_interval(&local[3], 4, TARGET_MILLIS, 2 * DEFAULT_DIFFICULTY);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePull).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { height: 8, .. }));

        let calls = recorder.calls.lock().clone();
        assert_eq!(
            calls,
            vec![
                (8, UndoMode::Rollback),
                (7, UndoMode::Rollback),
                (6, UndoMode::Rollback),
                (5, UndoMode::Rollback),
                (4, UndoMode::Common),
            ]
        );
    }

    #[test]
    fn test_pure_extension_skips_unwind() {
        let local = seeded_chain(5);
        let state = setup_state(&local);
        let recorder = UndoRecorder::default();
        let service = ChainSyncService::new(
            state,
            SyncHandlers::noop().with_undo_observer(Box::new(recorder.clone())),
        );

        let mut peer = extend(&local[4], 2);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { height: 7, .. }));
        assert!(recorder.calls.lock().is_empty());
    }

    #[test]
    fn test_reorg_reverts_only_unconfirmed_transactions() {
        let tx_a = transfer(10, 100, 1);
        let tx_b = transfer(20, 200, 2);
        let tx_c = transfer(30, 300, 3);

        let mut local = seeded_chain(4);
        local.extend(extend_with_transactions(
            &local[3],
            vec![vec![tx_a.clone()], vec![tx_b.clone()]],
        ));
        let state = setup_state(&local);

        let recorder = TransactionsChangeRecorder::default();
        let service = ChainSyncService::new(
            state,
            SyncHandlers::noop().with_transactions_change_observer(Box::new(recorder.clone())),
        );

        // The fork re-includes B, adds C, and grows one block longer.
        let mut peer = extend_with_transactions(
            &local[3],
            vec![vec![tx_b.clone()], vec![tx_c.clone()], vec![]],
        );
        let outcome = service.synchronize(&mut peer, InputSource::RemotePull).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { height: 7, .. }));

        assert_eq!(
            recorder.added.lock().clone(),
            vec![tx_b.entity_hash(), tx_c.entity_hash()]
        );
        assert_eq!(recorder.reverted.lock().clone(), vec![tx_a.entity_hash()]);
    }

    #[test]
    fn test_config_boundary_truncates_candidate_batch() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state.clone(), SyncHandlers::noop());

        // Block 5 announces a config effective at height 8; the batch
        // reaches 9, so heights 8..9 must be cut off.
        let mut peer = extend_with_transactions(
            &local[3],
            vec![vec![config_announcement(3)], vec![], vec![], vec![], vec![]],
        );
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();

        assert!(matches!(outcome, SyncOutcome::Continue { height: 7, .. }));
        assert_eq!(peer.len(), 3);
        assert_eq!(state.storage.view().chain_height(), 7);
    }

    #[test]
    fn test_truncation_can_flip_score_comparison() {
        let local = seeded_chain(6);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state.clone(), SyncHandlers::noop());

        // Four fork blocks beat the two local ones, but the config in
        // block 5 (effective at 6) leaves only one after truncation.
        let mut peer = extend_with_transactions(
            &local[3],
            vec![vec![config_announcement(1)], vec![], vec![], vec![]],
        );
        let outcome = service.synchronize(&mut peer, InputSource::RemotePull).unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Aborted(SyncRejection::ScoreNotBetter { .. })
        ));
        assert_eq!(state.storage.view().chain_height(), 6);
    }

    #[test]
    fn test_malformed_config_payload_rejected() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state, SyncHandlers::noop());

        let mut bad = config_announcement(3);
        if let shared_types::TransactionPayload::NetworkConfig { payload } = &mut bad.payload {
            payload.truncate(3);
        }
        let mut peer = extend_with_transactions(&local[3], vec![vec![], vec![bad]]);

        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Aborted(SyncRejection::NetworkConfigMalformed { height: 6 })
        );
    }

    #[test]
    fn test_ineligible_signer_aborts_without_mutation() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        // Full production processor: the fixture signer holds no stake.
        let service = ChainSyncService::new(
            state.clone(),
            SyncHandlers::noop().with_batch_processor(Box::new(BlockChainProcessor::standard())),
        );

        let mut peer = extend(&local[3], 2);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Aborted(SyncRejection::ValidationFailed(
                ValidationFailure::BlockNotHit { height: 5 }
            ))
        );
        assert_eq!(state.storage.view().chain_height(), 4);
        assert_eq!(state.cache.height(), 4);
        assert_eq!(state.score.current(), ChainScore::default());
        // The delta slot was released on rejection.
        assert!(state.cache.create_delta().is_ok());
    }

    #[test]
    fn test_executed_transfers_move_balances() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        fund_account(&state, [9; 32], 1_000);
        let service = ChainSyncService::new(state.clone(), production_handlers(&state));

        let mut peer = extend_with_transactions(&local[3], vec![vec![transfer(9, 300, 10)]]);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { height: 5, .. }));

        let read = state.cache.read();
        assert_eq!(read.account(&[9; 32]).unwrap().balance, 690);
        assert_eq!(read.account(&[109; 32]).unwrap().balance, 300);
    }

    #[test]
    fn test_generation_hashes_derived_from_common_ancestor() {
        let local = seeded_chain(4);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state.clone(), production_handlers(&state));

        let mut peer = extend(&local[3], 2);
        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert!(matches!(outcome, SyncOutcome::Continue { .. }));

        let common = state.storage.view().load_block_element(4).unwrap();
        let first = derive_generation_hash(&common.generation_hash, &peer[0].block.signer);
        let second = derive_generation_hash(&first, &peer[1].block.signer);
        assert_eq!(peer[0].generation_hash, first);
        assert_eq!(peer[1].generation_hash, second);

        // The stored elements carry the derived hashes too.
        let stored = state.storage.view().load_block_element(6).unwrap();
        assert_eq!(stored.generation_hash, second);
    }

    #[test]
    fn test_difficulty_mismatch_rejected_with_production_checker() {
        let local = seeded_chain(7);
        let state = setup_state(&local);
        let service = ChainSyncService::new(state.clone(), production_handlers(&state));

        let mut peer = extend(&local[6], 3);
        peer[1].block.difficulty -= 1;

        let outcome = service.synchronize(&mut peer, InputSource::RemotePush).unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Aborted(SyncRejection::MismatchedDifficulties { index: 1 })
        );
        assert_eq!(state.storage.view().chain_height(), 7);
    }
}
