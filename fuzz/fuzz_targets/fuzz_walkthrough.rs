#![no_main]

use libfuzzer_sys::fuzz_target;
use mathwalk::effect::SessionHooks;
use mathwalk::problem::{ProblemKind, ProblemSpec};
use mathwalk::session::{SessionConfig, SessionController};

const MAX_FIRES: usize = 20_000;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let kind = ProblemKind::ALL[usize::from(selector) % ProblemKind::ALL.len()];
    let operands: Vec<f64> = rest
        .chunks_exact(8)
        .take(4)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect();

    let config = SessionConfig::new(ProblemSpec::new(kind, operands));
    let Ok(mut session) = SessionController::new(config, SessionHooks::new()) else {
        return;
    };

    let mut last = 0;
    for _ in 0..MAX_FIRES {
        if session.on_timer_fire().is_none() {
            break;
        }
        let tick = session.tick_state().current_tick;
        assert_eq!(tick, last + 1);
        last = tick;
    }
});
