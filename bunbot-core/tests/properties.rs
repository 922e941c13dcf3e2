use bunbot_core::config::SequenceTimings;
use bunbot_core::console::{format_line, MAX_LINE_LEN};
use bunbot_core::sequencer::Sequencer;
use bunbot_core::state::{ToastEvent, ToastState};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Input {
    Press(u32),
    Tick(u32),
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        (0u32..20_000).prop_map(Input::Press),
        (0u32..20_000).prop_map(Input::Tick),
    ]
}

proptest! {
    #[test]
    fn sequencer_only_takes_machine_transitions(
        start in any::<u32>(),
        inputs in proptest::collection::vec(input(), 0..100),
    ) {
        let mut seq = Sequencer::new(SequenceTimings::default());
        let mut now = start;

        for input in inputs {
            let (event, result) = match input {
                Input::Press(dt) => {
                    now = now.wrapping_add(dt);
                    (ToastEvent::ButtonPressed, seq.press(now))
                }
                Input::Tick(dt) => {
                    now = now.wrapping_add(dt);
                    (ToastEvent::WaitElapsed, seq.tick(now))
                }
            };

            if let Some(t) = result {
                prop_assert_eq!(t.from.transition(event), t.to);
                prop_assert_ne!(t.from, t.to);
                prop_assert_eq!(seq.state(), t.to);
            }
        }
    }

    #[test]
    fn presses_never_interrupt_timed_states(index in 0u8..10) {
        let state = ToastState::from_index(index).unwrap();
        let next = state.transition(ToastEvent::ButtonPressed);
        if !state.is_waiting_for_button() {
            prop_assert_eq!(next, state);
        }
    }

    #[test]
    fn formatted_lines_fit(text in ".{0,300}") {
        let line = format_line(format_args!("{}", text));
        prop_assert!(line.len() <= MAX_LINE_LEN);
        prop_assert!(text.starts_with(line.as_str()));
    }
}
