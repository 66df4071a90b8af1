use crate::context::Context;
use crate::output::print_json;
use mnemono_core::cycle::requires_confirmation;
use mnemono_core::store::CycleStore;

pub fn run(ctx: &Context, name: &str, days: Option<&str>, force: bool, json: bool) -> anyhow::Result<()> {
    let assistant = ctx.assistant();
    let today = assistant.today();

    if !force {
        let existing = assistant.store().load();
        if requires_confirmation(existing.as_ref(), today) {
            if let Some(current) = existing {
                anyhow::bail!(
                    "cycle «{}» is in progress (day {} of {}); pass --force to replace it",
                    current.display_name(),
                    current.current_day_index(today),
                    current.total_days
                );
            }
        }
    }

    let name = Some(name.trim()).filter(|n| !n.is_empty());
    let reply = assistant.create_forced(name, days);

    if json {
        let cycle = assistant.store().load();
        print_json(&serde_json::json!({
            "message": reply,
            "cycle": cycle.map(|c| c.view(today)),
        }))?;
    } else {
        println!("{reply}");
    }
    Ok(())
}
