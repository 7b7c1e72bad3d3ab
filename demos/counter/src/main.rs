use repose_hooks::prelude::*;

type Setter = Dispatch<i32, Update<i32>>;

/// A widget-like callback: prints its label and count every time it runs.
fn counter_view() -> Hook<&'static str, Result<Setter, HookError>> {
    hooked_fallible(|label: &'static str| -> Result<Setter, HookError> {
        let (count, set_count) = use_state(0)?;
        log::info!("rendering {label}");
        println!("{label}: {count}");
        Ok(set_count)
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let view = counter_view();
    let set_count = view.call("Count")?;

    // Three writes in one tick: one re-render showing the final value.
    tick(|| {
        set_count.update(|c| c + 1);
        set_count.update(|c| c + 1);
        set_count.set(10);
    })?;

    // A direct call before the flush makes the scheduled re-render redundant.
    set_count.update(|c| c - 1);
    view.call("Count (direct)")?;
    run_microtasks()?;

    Ok(())
}
