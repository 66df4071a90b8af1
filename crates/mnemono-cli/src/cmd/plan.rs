use crate::context::Context;
use crate::output::print_json;
use mnemono_core::allocator;
use mnemono_core::stage::SONG_STAGES;

pub fn run(ctx: &Context, days: Option<&str>, json: bool) -> anyhow::Result<()> {
    let assistant = ctx.assistant();

    if json {
        let resolved = assistant.policy().resolve_days(days);
        let plan = allocator::schedule(&allocator::allocate(resolved.days, &SONG_STAGES));
        return print_json(&serde_json::json!({
            "total_days": resolved.days,
            "stages": plan,
        }));
    }

    println!("{}", assistant.plan(days));
    Ok(())
}
