use super::SlashCommand;

#[test]
fn it_parses_quit_commands() {
    for cmd in ["/q", "/quit", "/exit"] {
        assert!(SlashCommand::parse(cmd).unwrap().is_quit());
    }
}

#[test]
fn it_parses_model_list_commands() {
    for cmd in ["/ml", "/models", "/modellist"] {
        assert!(SlashCommand::parse(cmd).unwrap().is_model_list());
    }
}

#[test]
fn it_parses_model_set_commands_with_args() {
    let cmd = SlashCommand::parse("/model openai:gpt-4.1-mini").unwrap();
    assert!(cmd.is_model_set());
    assert_eq!(cmd.args, vec!["openai:gpt-4.1-mini".to_string()]);
}

#[test]
fn it_parses_help_commands() {
    for cmd in ["/h", "/help"] {
        assert!(SlashCommand::parse(cmd).unwrap().is_help());
    }
}

#[test]
fn it_rejects_plain_prompts() {
    assert!(SlashCommand::parse("hello there").is_none());
    assert!(SlashCommand::parse("/unknown").is_none());
}
