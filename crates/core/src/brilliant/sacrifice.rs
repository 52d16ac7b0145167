//! Material sacrifice detection

use serde::Serialize;
use shakmaty::{Chess, Color, Position};
use tracing::debug;

use crate::util::apply_uci;

use super::config::BrilliantConfig;

/// Verdict of the material balance check around one move.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SacrificeResult {
    pub is_sacrifice: bool,
    pub is_exchange_sacrifice: bool,
    /// Net material given up at the low point of the recovery window,
    /// with captured enemy material credited. Negative when the move wins
    /// material outright.
    pub material_lost: i32,
    /// Net material swing immediately after the move, before any recovery
    pub immediate_loss: i32,
}

impl SacrificeResult {
    /// Either flavor of sacrifice satisfies the gate.
    pub fn qualifies(&self) -> bool {
        self.is_sacrifice || self.is_exchange_sacrifice
    }
}

/// Material value of one side's pieces in centipawns.
pub fn side_material(position: &Chess, side: Color) -> i32 {
    let m = position.board().material_side(side);
    m.pawn as i32 * 100
        + m.knight as i32 * 320
        + m.bishop as i32 * 330
        + m.rook as i32 * 500
        + m.queen as i32 * 900
}

fn material_balance(position: &Chess, root: Color) -> i32 {
    side_material(position, root) - side_material(position, root.other())
}

/// Decides whether `uci` gives up material beyond the configured thresholds.
///
/// Works on the material balance from the mover's side, so a capture on the
/// sacrificed square is credited (queen takes knight and is recaptured nets
/// 580, rook takes knight nets 180). The balance can dip further after the
/// move before any tactical recovery, so the net loss is taken against the
/// minimum observed while replaying up to `sac_recovery_plies` of the
/// continuation. An illegal move in the continuation truncates the walk; the
/// minimum seen so far stands.
pub fn detect_sacrifice(
    before: &Chess,
    uci: &str,
    pv_after: &[String],
    root: Color,
    config: &BrilliantConfig,
) -> SacrificeResult {
    let balance_before = material_balance(before, root);

    let Some(mut position) = apply_uci(before, uci) else {
        debug!(uci, "sacrifice check skipped, move not legal here");
        return SacrificeResult::default();
    };

    let after_move = material_balance(&position, root);
    let mut min_balance = after_move;

    for mv in pv_after.iter().take(config.sac_recovery_plies) {
        match apply_uci(&position, mv) {
            Some(next) => position = next,
            None => {
                debug!(uci = mv.as_str(), "recovery walk truncated at illegal move");
                break;
            }
        }
        min_balance = min_balance.min(material_balance(&position, root));
    }

    let net_loss = balance_before - min_balance;

    SacrificeResult {
        is_sacrifice: net_loss >= config.sac_cp_min,
        is_exchange_sacrifice: net_loss >= config.sac_exchange_min && net_loss < config.sac_cp_min,
        material_lost: net_loss,
        immediate_loss: balance_before - after_move,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::position_from_fen;

    fn pv(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_starting_material() {
        let pos = Chess::default();
        // 8 pawns, 2 each of N/B/R, 1 queen: 800 + 640 + 660 + 1000 + 900
        assert_eq!(side_material(&pos, Color::White), 4000);
        assert_eq!(side_material(&pos, Color::Black), 4000);
    }

    #[test]
    fn test_quiet_move_is_not_a_sacrifice() {
        let config = BrilliantConfig::default();
        let pos = Chess::default();
        let result = detect_sacrifice(&pos, "e2e4", &pv(&["e7e5", "g1f3"]), Color::White, &config);
        assert!(!result.qualifies());
        assert_eq!(result.material_lost, 0);
    }

    #[test]
    fn test_queen_for_knight_is_a_sacrifice() {
        let config = BrilliantConfig::default();
        // White queen takes a defended knight on d4 and is recaptured
        let pos =
            position_from_fen("r4rk1/ppp2ppp/8/4p3/3n4/8/PPP2PPP/R2Q1RK1 w - - 0 15").unwrap();
        let result = detect_sacrifice(&pos, "d1d4", &pv(&["e5d4"]), Color::White, &config);
        assert!(result.is_sacrifice);
        assert!(!result.is_exchange_sacrifice);
        // Queen lost, knight won: net 900 - 320
        assert_eq!(result.material_lost, 580);
        // Before the recapture the capture has won a knight
        assert_eq!(result.immediate_loss, -320);
    }

    #[test]
    fn test_rook_for_knight_is_an_exchange() {
        let config = BrilliantConfig::default();
        // White rook takes a defended knight on d5, pawn recaptures
        let pos = position_from_fen("5rk1/pp3ppp/2p5/3n4/8/8/PPP2PPP/3R2K1 w - - 0 20").unwrap();
        let result = detect_sacrifice(&pos, "d1d5", &pv(&["c6d5"]), Color::White, &config);
        assert!(result.is_exchange_sacrifice);
        assert!(!result.is_sacrifice);
        assert_eq!(result.material_lost, 180);
        assert!(result.qualifies());
    }

    #[test]
    fn test_threshold_edges() {
        // The rook-for-knight net of 180 sits on whichever side of the
        // thresholds the config puts it
        let pos = position_from_fen("5rk1/pp3ppp/2p5/3n4/8/8/PPP2PPP/3R2K1 w - - 0 20").unwrap();
        let continuation = pv(&["c6d5"]);

        let mut config = BrilliantConfig::default();
        config.sac_exchange_min = 180;
        let result = detect_sacrifice(&pos, "d1d5", &continuation, Color::White, &config);
        assert!(result.is_exchange_sacrifice);

        config.sac_exchange_min = 181;
        let result = detect_sacrifice(&pos, "d1d5", &continuation, Color::White, &config);
        assert!(!result.qualifies());

        config.sac_exchange_min = 150;
        config.sac_cp_min = 180;
        let result = detect_sacrifice(&pos, "d1d5", &continuation, Color::White, &config);
        assert!(result.is_sacrifice);
        assert!(!result.is_exchange_sacrifice);

        config.sac_cp_min = 181;
        let result = detect_sacrifice(&pos, "d1d5", &continuation, Color::White, &config);
        assert!(result.is_exchange_sacrifice);
        assert!(!result.is_sacrifice);
    }

    #[test]
    fn test_illegal_continuation_truncates() {
        let config = BrilliantConfig::default();
        let pos =
            position_from_fen("r4rk1/ppp2ppp/8/4p3/3n4/8/PPP2PPP/R2Q1RK1 w - - 0 15").unwrap();
        // Garbage continuation: only the immediate position counts, and
        // there the queen has simply won a knight
        let result = detect_sacrifice(&pos, "d1d4", &pv(&["zz99"]), Color::White, &config);
        assert!(!result.qualifies());
        assert_eq!(result.material_lost, -320);
    }

    #[test]
    fn test_illegal_candidate_move_is_no_sacrifice() {
        let config = BrilliantConfig::default();
        let pos = Chess::default();
        let result = detect_sacrifice(&pos, "d1d8", &[], Color::White, &config);
        assert!(!result.qualifies());
    }
}
