use super::*;
use crate::services::matchmaker;
use crate::state::test_helpers;
use tokio::time::{Duration, timeout};

async fn recv_message(rx: &mut mpsc::Receiver<ServerMessage>) -> ServerMessage {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("message receive timed out")
        .expect("channel closed")
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<ServerMessage>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

/// Pair two participants and drain their game_status traffic.
async fn paired_state() -> (
    crate::state::AppState,
    Uuid,
    mpsc::Receiver<ServerMessage>,
    Uuid,
    mpsc::Receiver<ServerMessage>,
) {
    let state = test_helpers::test_app_state();
    let (first, mut first_rx) = test_helpers::connect(&state).await;
    let (second, mut second_rx) = test_helpers::connect(&state).await;
    matchmaker::join_queue(&state, first).await;
    matchmaker::join_queue(&state, second).await;

    recv_message(&mut first_rx).await; // waiting
    recv_message(&mut first_rx).await; // started
    recv_message(&mut second_rx).await; // started

    (state, first, first_rx, second, second_rx)
}

#[tokio::test]
async fn register_connection_mints_unique_identities() {
    let state = test_helpers::test_app_state();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);

    let a = register_connection(&state, tx_a).await;
    let b = register_connection(&state, tx_b).await;

    assert_ne!(a, b);
    let lobby = state.lobby.read().await;
    assert!(lobby.participants[&a].assignment.is_none());
    assert!(lobby.participants.contains_key(&b));
}

#[tokio::test]
async fn locate_resolves_assignment_after_matching() {
    let (state, first, _rx1, second, _rx2) = paired_state().await;

    let located_first = locate(&state, first).await.expect("first is assigned");
    let located_second = locate(&state, second).await.expect("second is assigned");

    assert_eq!(located_first.seat, Seat::One);
    assert_eq!(located_second.seat, Seat::Two);
    assert_eq!(located_first.session_id, located_second.session_id);
}

#[tokio::test]
async fn locate_returns_none_for_unknown_participants() {
    let state = test_helpers::test_app_state();
    assert!(locate(&state, Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn move_from_unknown_participant_is_game_not_found() {
    let state = test_helpers::test_app_state();
    let reply = route_move(&state, Uuid::new_v4(), 0).await;

    match reply {
        ServerMessage::MoveResult { success, message, state } => {
            assert!(!success);
            assert_eq!(message, "game not found");
            assert!(state.is_none(), "no snapshot without a session");
        }
        other => panic!("expected move_result, got {other:?}"),
    }
}

#[tokio::test]
async fn applied_move_is_broadcast_to_both_seats() {
    let (state, first, mut first_rx, _second, mut second_rx) = paired_state().await;

    let reply = route_move(&state, first, 0).await;
    match reply {
        ServerMessage::MoveResult { success, state: Some(snapshot), .. } => {
            assert!(success);
            assert_eq!(snapshot.board[5][0], 1);
            assert_eq!(snapshot.current_player, 2);
            assert!(!snapshot.game_over);
        }
        other => panic!("expected successful move_result, got {other:?}"),
    }

    for rx in [&mut first_rx, &mut second_rx] {
        match recv_message(rx).await {
            ServerMessage::GameUpdate { state } => {
                assert_eq!(state.board[5][0], 1);
                assert_eq!(state.current_player, 2);
            }
            other => panic!("expected game_update, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn rejected_move_reaches_only_the_requester() {
    let (state, _first, mut first_rx, second, mut second_rx) = paired_state().await;

    // Seat two tries to pre-empt seat one's turn.
    let reply = route_move(&state, second, 3).await;
    match reply {
        ServerMessage::MoveResult { success, message, state } => {
            assert!(!success);
            assert_eq!(message, "not your turn");
            let snapshot = state.expect("session was located");
            assert_eq!(snapshot.current_player, 1);
            assert_eq!(snapshot.board, [[0u8; 7]; 6]);
        }
        other => panic!("expected move_result, got {other:?}"),
    }

    assert_channel_empty(&mut first_rx).await;
    assert_channel_empty(&mut second_rx).await;
}

#[tokio::test]
async fn full_column_error_carries_the_untouched_snapshot() {
    let (state, first, mut first_rx, second, mut second_rx) = paired_state().await;

    for _ in 0..3 {
        route_move(&state, first, 2).await;
        route_move(&state, second, 2).await;
        recv_message(&mut first_rx).await;
        recv_message(&mut first_rx).await;
        recv_message(&mut second_rx).await;
        recv_message(&mut second_rx).await;
    }
    // Column 2 now holds six pieces; seat one's drop must fail.
    let reply = route_move(&state, first, 2).await;
    match reply {
        ServerMessage::MoveResult { success, message, state: Some(snapshot) } => {
            assert!(!success);
            assert_eq!(message, "column is full");
            assert_eq!(snapshot.current_player, 1);
            assert!(!snapshot.game_over);
        }
        other => panic!("expected move_result with snapshot, got {other:?}"),
    }
    assert_channel_empty(&mut first_rx).await;
}

#[tokio::test]
async fn moves_after_a_win_are_rejected_as_inactive() {
    let (state, first, mut first_rx, second, mut second_rx) = paired_state().await;

    // Seat one lines up 0..=3 while seat two stacks column 6.
    for col in 0..3 {
        route_move(&state, first, col).await;
        route_move(&state, second, 6).await;
    }
    let winning = route_move(&state, first, 3).await;
    match winning {
        ServerMessage::MoveResult { success, state: Some(snapshot), .. } => {
            assert!(success);
            assert!(snapshot.game_over);
            assert_eq!(snapshot.winner, Some(1));
        }
        other => panic!("expected winning move_result, got {other:?}"),
    }

    let reply = route_move(&state, second, 0).await;
    match reply {
        ServerMessage::MoveResult { success, message, state } => {
            assert!(!success);
            assert_eq!(message, "game is not active");
            assert_eq!(state.expect("session still exists").winner, Some(1));
        }
        other => panic!("expected move_result, got {other:?}"),
    }

    // Drain broadcasts; the rejected move must not have added any.
    for _ in 0..7 {
        recv_message(&mut first_rx).await;
        recv_message(&mut second_rx).await;
    }
    assert_channel_empty(&mut first_rx).await;
    assert_channel_empty(&mut second_rx).await;
}

#[tokio::test]
async fn invalid_column_error_propagates_through_the_router() {
    let (state, first, _rx1, _second, _rx2) = paired_state().await;

    let reply = route_move(&state, first, 42).await;
    match reply {
        ServerMessage::MoveResult { success, message, .. } => {
            assert!(!success);
            assert_eq!(message, "invalid column");
        }
        other => panic!("expected move_result, got {other:?}"),
    }
}

#[tokio::test]
async fn moves_against_a_waiting_session_are_inactive() {
    let state = test_helpers::test_app_state();
    let (first, mut rx) = test_helpers::connect(&state).await;
    matchmaker::join_queue(&state, first).await;
    recv_message(&mut rx).await; // waiting status

    let reply = route_move(&state, first, 0).await;
    match reply {
        ServerMessage::MoveResult { success, message, .. } => {
            assert!(!success);
            assert_eq!(message, "game is not active");
        }
        other => panic!("expected move_result, got {other:?}"),
    }
}

#[tokio::test]
async fn removed_participant_resolves_to_game_not_found() {
    let (state, first, _rx1, _second, _rx2) = paired_state().await;

    remove_participant(&state, first).await;

    let reply = route_move(&state, first, 0).await;
    match reply {
        ServerMessage::MoveResult { message, .. } => assert_eq!(message, "game not found"),
        other => panic!("expected move_result, got {other:?}"),
    }
}
