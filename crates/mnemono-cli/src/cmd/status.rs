use crate::context::Context;
use crate::output::print_json;
use mnemono_core::store::CycleStore;

pub fn run(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let assistant = ctx.assistant();

    if json {
        let view = assistant
            .store()
            .load()
            .map(|c| c.view(assistant.today()));
        return print_json(&serde_json::json!({
            "active": view.is_some(),
            "cycle": view,
        }));
    }

    println!("{}", assistant.status());
    Ok(())
}
