use std::path::PathBuf;
use std::time::Instant;

use voist_rs::{
    analyzers::mecab::MecabSource, plan_draw, LayoutConfig, Prompt, PromptMetadata, PromptSet,
};

const PANEL_WIDTH: u32 = 840;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let source = MecabSource::new();
    let mut args = std::env::args().skip(1);

    let config = match std::env::var_os("VOIST_LAYOUT_CONFIG") {
        Some(path) => LayoutConfig::load(&PathBuf::from(path))?,
        None => LayoutConfig::default(),
    };
    let params = config.parameters(PANEL_WIDTH)?;

    let prompts = match args.next() {
        Some(path) => PromptSet::load(&PathBuf::from(path), &source, 10_000)?
            .prompts()
            .to_vec(),
        None => {
            let meta = PromptMetadata {
                id: "demo".to_string(),
                ..Default::default()
            };
            let script = "/今日@きょう/は/天気@てんき/が/良@よ/い/の/で、;\
                          /公園@こうえん/まで/散歩@さんぽ/に/行@い/きましょう。";
            vec![Prompt::parse(meta, script, &source)?]
        }
    };

    for prompt in &prompts {
        let start = Instant::now();
        let outcome = prompt.layout(&params);
        let elapsed = start.elapsed();

        println!(
            "{}: {} tokens, {} line(s) at {}px, threshold {}{} ({} attempts, {:.2?})",
            prompt.full_name("wav"),
            prompt.tokens().len(),
            outcome.line_count,
            outcome.font_size,
            outcome.line_break_threshold,
            if outcome.forced { ", forced" } else { "" },
            outcome.attempts,
            elapsed
        );

        for command in plan_draw(prompt.tokens(), &outcome, config.ruby_mode, &config.canvas) {
            println!(
                "  {:?} ({:4}, {:4}) {:3}px {}",
                command.role, command.x, command.y, command.font_size, command.text
            );
        }
    }

    Ok(())
}
