use anyhow::Result;
use swftriage_core::report::HEURISTICS;

/// List the heuristics a report can raise.
pub fn list_heuristics_command(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(HEURISTICS)?);
        return Ok(());
    }

    println!("Heuristics:");
    for h in HEURISTICS {
        println!("- {}: {}", h.id, h.name);
        println!("    {}", h.description);
    }

    Ok(())
}
