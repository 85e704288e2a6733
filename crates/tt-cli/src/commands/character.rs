use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tt_core::{Ability, CharacterId, NewCharacter};

use super::{Context, or_dash};

pub fn add(ctx: &Context, new: NewCharacter) -> Result<(), String> {
    let mut store = ctx.load()?;
    let id = store
        .create_character(ctx.user, new)
        .map_err(|e| e.to_string())?;
    ctx.save(&store)?;

    let name = store.character(id).map(|c| c.name.as_str()).unwrap_or_default();
    println!("  Created character {} (#{id})", name.bold());
    Ok(())
}

pub fn list(ctx: &Context, public: bool, tag: Option<&str>) -> Result<(), String> {
    let store = ctx.load()?;
    let characters: Vec<_> = if public {
        store.public_characters()
    } else {
        store.characters(Some(ctx.user))
    }
    .into_iter()
    .filter(|c| tag.is_none_or(|t| c.has_tag(t)))
    .collect();

    if characters.is_empty() {
        println!("  No characters found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "HP", "AC", "Speed", "Init", "Tags"]);

    for c in &characters {
        table.add_row(vec![
            c.id.to_string(),
            c.name.clone(),
            c.hp.to_string(),
            c.ac.to_string(),
            c.speed.to_string(),
            format!("{:+}", c.initiative),
            or_dash(&c.tags.join(", ")).to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} characters", characters.len());
    Ok(())
}

pub fn show(ctx: &Context, id: u64) -> Result<(), String> {
    let store = ctx.load()?;
    let id = CharacterId(id);
    let character = ctx.visible_character(&store, id)?;

    let visibility = if character.is_public { "public" } else { "private" };
    println!(
        "  {} [#{id}, {}]",
        character.name.bold(),
        visibility.dimmed()
    );
    println!();
    println!("  hp:         {}", character.hp);
    println!("  ac:         {}", character.ac);
    println!("  speed:      {}", character.speed);
    println!("  initiative: {:+}", character.initiative);
    if !character.tags.is_empty() {
        println!("  tags:       {}", character.tags.join(", "));
    }

    if character.abilities.is_empty() {
        return Ok(());
    }

    println!();
    println!("  {}", "Abilities".bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Damage", "Range", "Effect", "Description"]);
    for ability in &character.abilities {
        let name = if ability.is_passive {
            format!("{} (passive)", ability.name)
        } else {
            ability.name.clone()
        };
        table.add_row(vec![
            ability.id.clone(),
            name,
            or_dash(ability.damage.as_deref().unwrap_or_default()).to_string(),
            or_dash(ability.range.as_deref().unwrap_or_default()).to_string(),
            or_dash(ability.effect.as_deref().unwrap_or_default()).to_string(),
            or_dash(&ability.description).to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn delete(ctx: &Context, id: u64) -> Result<(), String> {
    let mut store = ctx.load()?;
    let id = CharacterId(id);
    let character = store
        .character(id)
        .ok_or_else(|| format!("character not found: {id}"))?;
    ctx.ensure_owner(character.owner, &format!("character {id}"))?;

    store.delete_character(id);
    ctx.save(&store)?;
    println!("  Deleted character #{id}");
    Ok(())
}

pub fn ability(ctx: &Context, id: u64, ability: Ability) -> Result<(), String> {
    let mut store = ctx.load()?;
    let id = CharacterId(id);
    let character = store
        .character(id)
        .ok_or_else(|| format!("character not found: {id}"))?;
    ctx.ensure_owner(character.owner, &format!("character {id}"))?;

    let ability_id = ability.id.clone();
    let character = store
        .update_character(id, |c| c.add_ability(ability))
        .map_err(|e| e.to_string())?;
    let name = character.name.clone();
    ctx.save(&store)?;

    println!("  Added ability {} to {}", ability_id.bold(), name.bold());
    Ok(())
}
