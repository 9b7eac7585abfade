use super::Conversation;
use super::Message;
use super::MAX_TURNS;

fn full_history() -> Conversation {
    let mut conversation = Conversation::default();
    for turn in 1..=MAX_TURNS {
        conversation.push(Message::user(&format!("u{turn}")));
        conversation.push(Message::assistant(&format!("a{turn}")));
    }

    return conversation;
}

#[test]
fn it_keeps_a_full_history_untouched() {
    let conversation = full_history();
    assert!(!conversation.is_empty());
    assert_eq!(conversation.len(), MAX_TURNS * 2);
    assert_eq!(conversation.messages()[0].content, "u1".to_string());
}

#[test]
fn it_drops_the_oldest_pair_on_overflow() {
    let mut conversation = full_history();
    conversation.push(Message::user("u21"));

    assert_eq!(conversation.len(), MAX_TURNS * 2 - 1);
    assert_eq!(conversation.messages()[0].content, "u2".to_string());
    assert_eq!(conversation.messages()[1].content, "a2".to_string());
    assert_eq!(
        conversation.messages().last().unwrap().content,
        "u21".to_string()
    );
}

#[test]
fn it_preserves_relative_order_after_truncation() {
    let mut conversation = full_history();
    conversation.push(Message::user("u21"));
    conversation.push(Message::assistant("a21"));

    let contents = conversation
        .messages()
        .iter()
        .map(|msg| return msg.content.clone())
        .collect::<Vec<String>>();

    assert_eq!(contents[0], "u2".to_string());
    assert_eq!(contents[contents.len() - 2], "u21".to_string());
    assert_eq!(contents[contents.len() - 1], "a21".to_string());
    assert_eq!(contents.len(), MAX_TURNS * 2);
}

#[test]
fn it_clones_the_payload() {
    let conversation = full_history();
    let payload = conversation.payload();
    assert_eq!(payload.len(), conversation.len());
    assert_eq!(payload[0], conversation.messages()[0]);
}
