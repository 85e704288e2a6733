use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tt_core::{CharacterId, CoreError, Store, Team, TeamId};

use super::{Context, or_dash};

/// Look up a team the acting user owns.
fn owned_team<'s>(ctx: &Context, store: &'s Store, id: TeamId) -> Result<&'s Team, String> {
    let team = store
        .team(id)
        .ok_or_else(|| format!("team not found: {id}"))?;
    ctx.ensure_owner(team.owner, &format!("team {id}"))?;
    Ok(team)
}

pub fn create(ctx: &Context, name: &str, members: &[u64]) -> Result<(), String> {
    let mut store = ctx.load()?;
    let members: Vec<CharacterId> = members.iter().copied().map(CharacterId).collect();
    for &id in &members {
        ctx.visible_character(&store, id)?;
    }

    let id = store
        .create_team(ctx.user, name, &members)
        .map_err(|e| e.to_string())?;
    ctx.save(&store)?;
    println!("  Created team {} (#{id})", name.bold());
    Ok(())
}

pub fn list(ctx: &Context) -> Result<(), String> {
    let store = ctx.load()?;
    let teams = store.teams(Some(ctx.user));

    if teams.is_empty() {
        println!("  No teams found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Members"]);

    for team in &teams {
        let names: Vec<String> = store
            .resolve_roster(&team.character_ids)
            .into_iter()
            .map(|(_, c)| c.map_or_else(|| "(missing)".to_string(), |c| c.name.clone()))
            .collect();
        table.add_row(vec![
            team.id.to_string(),
            team.name.clone(),
            or_dash(&names.join(", ")).to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} teams", teams.len());
    Ok(())
}

pub fn show(ctx: &Context, id: u64) -> Result<(), String> {
    let store = ctx.load()?;
    let team = owned_team(ctx, &store, TeamId(id))?;

    println!(
        "  {} {}",
        team.name.bold(),
        format!("[#{}, {} members]", team.id, team.len()).dimmed()
    );
    if team.is_empty() {
        println!("  (no members)");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "HP", "AC", "Init", "Selected abilities"]);

    for (cid, character) in store.resolve_roster(&team.character_ids) {
        let selected = team.selected_abilities(cid).join(", ");
        let row = match character {
            Some(c) => vec![
                cid.to_string(),
                c.name.clone(),
                c.hp.to_string(),
                c.ac.to_string(),
                format!("{:+}", c.initiative),
                or_dash(&selected).to_string(),
            ],
            None => vec![
                cid.to_string(),
                "(missing)".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                or_dash(&selected).to_string(),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}

pub fn add(ctx: &Context, team: u64, character: u64) -> Result<(), String> {
    let mut store = ctx.load()?;
    let (team, character) = (TeamId(team), CharacterId(character));
    owned_team(ctx, &store, team)?;
    ctx.visible_character(&store, character)?;

    let updated = store
        .update_team(team, |t, rules| t.add_member(character, rules))
        .map_err(|e| e.to_string())?;
    let summary = format!("  {} now has {} members", updated.name.bold(), updated.len());
    ctx.save(&store)?;
    println!("{summary}");
    Ok(())
}

pub fn remove(ctx: &Context, team: u64, character: u64) -> Result<(), String> {
    let mut store = ctx.load()?;
    let (team, character) = (TeamId(team), CharacterId(character));
    owned_team(ctx, &store, team)?;

    let updated = store
        .update_team(team, |t, _| {
            if t.remove_member(character) {
                Ok(())
            } else {
                Err(CoreError::NotAMember {
                    team: t.name.clone(),
                    character,
                })
            }
        })
        .map_err(|e| e.to_string())?;
    let summary = format!("  {} now has {} members", updated.name.bold(), updated.len());
    ctx.save(&store)?;
    println!("{summary}");
    Ok(())
}

pub fn select(
    ctx: &Context,
    team: u64,
    character: u64,
    ability: &str,
    off: bool,
) -> Result<(), String> {
    let mut store = ctx.load()?;
    let (team, character) = (TeamId(team), CharacterId(character));
    owned_team(ctx, &store, team)?;

    if off {
        let mut removed = false;
        store
            .update_team(team, |t, _| {
                removed = t.deselect_ability(character, ability);
                Ok(())
            })
            .map_err(|e| e.to_string())?;
        if !removed {
            return Err(format!(
                "ability \"{ability}\" is not selected for character {character}"
            ));
        }
        ctx.save(&store)?;
        println!("  Deselected {} for character #{character}", ability.bold());
        return Ok(());
    }

    let known = ctx
        .visible_character(&store, character)?
        .ability(ability)
        .is_some();
    if !known {
        return Err(format!("character {character} has no ability \"{ability}\""));
    }

    store
        .update_team(team, |t, _| t.select_ability(character, ability))
        .map_err(|e| e.to_string())?;
    ctx.save(&store)?;
    println!("  Selected {} for character #{character}", ability.bold());
    Ok(())
}

pub fn delete(ctx: &Context, id: u64) -> Result<(), String> {
    let mut store = ctx.load()?;
    let id = TeamId(id);
    owned_team(ctx, &store, id)?;

    store.delete_team(id);
    ctx.save(&store)?;
    println!("  Deleted team #{id}");
    Ok(())
}
