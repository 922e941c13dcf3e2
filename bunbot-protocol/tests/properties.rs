use bunbot_protocol::{
    parse_announcement, BroadcastMessage, CommandSet, ConsoleCommand, LineBuffer, StatusLine,
    MESSAGE_SIZE,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = BroadcastMessage::decode(&bytes);
    }

    #[test]
    fn decode_of_encoded_message_is_identity(text in "[ -~]{0,31}", value in any::<i32>()) {
        let msg = BroadcastMessage::new(&text, value).unwrap();
        let bytes = msg.encode();
        prop_assert_eq!(bytes.len(), MESSAGE_SIZE);
        prop_assert_eq!(BroadcastMessage::decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn announcement_parse_is_total(text in ".{0,40}") {
        if let Some(index) = parse_announcement(&text) {
            prop_assert!(index < 10);
        }
    }

    #[test]
    fn duty_commands_stay_in_range(line in "[-+]?[0-9]{1,6}[a-z%]{0,3}") {
        if let ConsoleCommand::Duty(percent) = ConsoleCommand::parse(&line, CommandSet::CHEF) {
            prop_assert!(percent <= 100);
        }
    }

    #[test]
    fn line_buffer_never_yields_untrimmed(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        let mut buffer = LineBuffer::<32>::new();
        for byte in bytes {
            if let Some(line) = buffer.feed(byte) {
                prop_assert!(!line.is_empty());
                prop_assert_eq!(line.trim(), line.as_str());
            }
        }
    }

    #[test]
    fn status_parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = StatusLine::parse(&bytes);
    }
}
