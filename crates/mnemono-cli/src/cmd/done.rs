use crate::context::Context;
use crate::output::print_json;
use mnemono_core::store::CycleStore;

pub fn run(ctx: &Context, stage: &str, json: bool) -> anyhow::Result<()> {
    let assistant = ctx.assistant();
    let reply = assistant.complete(stage);

    if json {
        let completed = assistant
            .store()
            .load()
            .and_then(|c| {
                c.stages
                    .iter()
                    .find(|s| s.matches_label(stage))
                    .map(|s| s.completed)
            })
            .unwrap_or(false);
        print_json(&serde_json::json!({
            "stage": stage,
            "completed": completed,
            "message": reply,
        }))?;
    } else {
        println!("{reply}");
    }
    Ok(())
}
