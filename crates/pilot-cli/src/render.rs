use bat::WrappingMode;
use console::{style, Term};
use pilot::agent::Agent;

const THEME: &str = "zenburn";

/// Print an answer as highlighted markdown, or plain text when bat cannot
pub fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .colored_output(Term::stdout().is_term())
        .wrapping_mode(WrappingMode::Character)
        .print();

    if let Err(e) = printed {
        tracing::debug!("markdown rendering failed: {}", e);
        println!("{}", content);
    }
    println!();
}

pub fn print_banner(agent: &Agent) {
    let provider = agent.provider();
    println!(
        "{} {}",
        style("pilot").bold().cyan(),
        style("- type \"exit\" to end the session").dim()
    );
    println!(
        "{}: {}  {}: {}",
        style("provider").dim(),
        style(provider.name()).green(),
        style("model").dim(),
        style(provider.model()).green()
    );
    println!(
        "{}: {}",
        style("tools").dim(),
        agent.registry().names().join(", ")
    );
    println!();
}

/// Shown when the turn budget ran out or the backend had nothing to say
pub fn print_no_answer(max_turns: usize) {
    println!(
        "{}",
        style(format!(
            "No answer within {} turn(s). Try rephrasing or raising --max-turns.",
            max_turns
        ))
        .dim()
    );
    println!();
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", style("error:").red().bold(), error);
    println!();
}
