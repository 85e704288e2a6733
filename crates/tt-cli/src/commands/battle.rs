use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tt_core::{Battle, BattleCharacterState, BattleId, CharacterId, Side, Store, TeamId};
use tt_mechanics::{CombatantUpdate, TurnEngine};

use super::{Context, or_dash};

/// A hit point change given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HpChange {
    Set(u32),
    Adjust(i64),
}

impl HpChange {
    /// `12` sets, `+3` and `-4` adjust.
    fn parse(value: &str) -> Result<Self, String> {
        let amount = |digits: &str| {
            digits
                .starts_with(|c: char| c.is_ascii_digit())
                .then(|| digits.parse::<u32>().ok())
                .flatten()
                .ok_or_else(|| {
                    format!("invalid hit points: \"{value}\" (expected 12, +3, or -4)")
                })
        };
        if let Some(rest) = value.strip_prefix('+') {
            amount(rest).map(|n| Self::Adjust(i64::from(n)))
        } else if let Some(rest) = value.strip_prefix('-') {
            amount(rest).map(|n| Self::Adjust(-i64::from(n)))
        } else {
            amount(value).map(Self::Set)
        }
    }
}

fn owned_battle<'s>(ctx: &Context, store: &'s Store, id: BattleId) -> Result<&'s Battle, String> {
    let battle = store
        .battle(id)
        .ok_or_else(|| format!("battle not found: {id}"))?;
    ctx.ensure_owner(battle.owner, &format!("battle {id}"))?;
    Ok(battle)
}

/// The side to act on: the one given, or wherever the character fights.
fn resolve_side(
    engine: &TurnEngine,
    battle: BattleId,
    character: CharacterId,
    side: Option<&str>,
) -> Result<Side, String> {
    match side {
        Some(s) => Side::parse(s).ok_or_else(|| format!("unknown side: \"{s}\"")),
        None => engine
            .side_of(character)
            .ok_or_else(|| format!("character {character} is not in battle {battle}")),
    }
}

fn name_of(store: &Store, id: CharacterId) -> String {
    store
        .character(id)
        .map_or_else(|| "(missing)".to_string(), |c| c.name.clone())
}

fn describe_active(store: &Store, engine: &TurnEngine) -> String {
    match engine.active_combatant() {
        Some((side, state)) => format!("{} ({side})", name_of(store, state.character_id)),
        None => "-".to_string(),
    }
}

/// Run an engine edit against a stored battle and save it.
fn edit_battle<F, T>(ctx: &Context, id: u64, edit: F) -> Result<(Store, T), String>
where
    F: FnOnce(&Store, &mut TurnEngine) -> Result<T, String>,
{
    let mut store = ctx.load()?;
    let id = BattleId(id);
    let mut engine = TurnEngine::from_battle(owned_battle(ctx, &store, id)?);
    let value = edit(&store, &mut engine)?;

    store
        .update_battle(id, |b| {
            engine.write_back(b);
            Ok(())
        })
        .map_err(|e| e.to_string())?;
    ctx.save(&store)?;
    Ok((store, value))
}

pub fn start(ctx: &Context, name: &str, team: u64, opponents: Option<u64>) -> Result<(), String> {
    let mut store = ctx.load()?;
    let team = TeamId(team);
    let opponents = opponents.map(TeamId);
    for id in std::iter::once(team).chain(opponents) {
        let owner = store
            .team(id)
            .ok_or_else(|| format!("team not found: {id}"))?
            .owner;
        ctx.ensure_owner(owner, &format!("team {id}"))?;
    }

    let id = tt_mechanics::start_battle(&mut store, ctx.user, name, team, opponents)
        .map_err(|e| e.to_string())?;
    ctx.save(&store)?;

    let battle = owned_battle(ctx, &store, id)?;
    let engine = TurnEngine::from_battle(battle);
    println!(
        "  Started battle {} (#{id}) with {} combatants",
        name.bold(),
        battle.battle_state.len()
    );
    println!("  First up: {}", describe_active(&store, &engine));
    Ok(())
}

pub fn list(ctx: &Context) -> Result<(), String> {
    let store = ctx.load()?;
    let battles = store.battles(Some(ctx.user));

    if battles.is_empty() {
        println!("  No battles found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Turn", "Combatants", "Active"]);

    for battle in &battles {
        let engine = TurnEngine::from_battle(battle);
        table.add_row(vec![
            battle.id.to_string(),
            battle.name.clone(),
            engine.current_turn().to_string(),
            battle.battle_state.len().to_string(),
            describe_active(&store, &engine),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} battles", battles.len());
    Ok(())
}

pub fn show(ctx: &Context, id: u64) -> Result<(), String> {
    let store = ctx.load()?;
    let battle = owned_battle(ctx, &store, BattleId(id))?;
    let engine = TurnEngine::from_battle(battle);

    let round = engine
        .round()
        .map_or_else(String::new, |r| format!(", round {r}"));
    println!(
        "  {} {}",
        battle.name.bold(),
        format!("[#{}, turn {}{round}]", battle.id, engine.current_turn()).dimmed()
    );

    if engine.state().is_empty() {
        println!("  (no combatants)");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Order", "Side", "ID", "Name", "HP", "Status"]);

    let active = engine.active_index();
    for (i, (side, state)) in engine.initiative_order().into_iter().enumerate() {
        table.add_row(row(&store, side, state, active == Some(i)));
    }

    println!("{table}");
    Ok(())
}

fn row(store: &Store, side: Side, state: &BattleCharacterState, active: bool) -> Vec<String> {
    let hp = match store.character(state.character_id) {
        Some(c) => format!("{}/{}", state.current_hp, c.hp),
        None => state.current_hp.to_string(),
    };
    vec![
        if active { ">".to_string() } else { String::new() },
        state.turn_order.to_string(),
        side.to_string(),
        state.character_id.to_string(),
        name_of(store, state.character_id),
        hp,
        or_dash(&state.status).to_string(),
    ]
}

pub fn next(ctx: &Context, id: u64) -> Result<(), String> {
    let (store, (turn, active)) = edit_battle(ctx, id, |_, engine| {
        let turn = engine.advance_turn();
        Ok((turn, engine.active_combatant().map(|(s, c)| (s, c.character_id))))
    })?;

    match active {
        Some((side, character)) => println!(
            "  Turn {turn}: {} ({side})",
            name_of(&store, character).bold()
        ),
        None => println!("  Turn {turn}: no combatants"),
    }
    Ok(())
}

pub fn hp(
    ctx: &Context,
    id: u64,
    character: u64,
    value: &str,
    side: Option<&str>,
) -> Result<(), String> {
    let change = HpChange::parse(value)?;
    let character = CharacterId(character);

    let (store, hp) = edit_battle(ctx, id, |_, engine| {
        let side = resolve_side(engine, BattleId(id), character, side)?;
        let hp = match change {
            HpChange::Set(hp) => engine
                .update_combatant(side, character, CombatantUpdate::default().hp(hp))
                .then_some(hp),
            HpChange::Adjust(delta) => engine.adjust_hp(side, character, delta),
        };
        hp.ok_or_else(|| format!("character {character} is not among the {side}"))
    })?;

    println!("  {}: {hp} HP", name_of(&store, character).bold());
    Ok(())
}

pub fn status(
    ctx: &Context,
    id: u64,
    character: u64,
    status: &str,
    side: Option<&str>,
) -> Result<(), String> {
    let character = CharacterId(character);

    let (store, ()) = edit_battle(ctx, id, |_, engine| {
        let side = resolve_side(engine, BattleId(id), character, side)?;
        let update = CombatantUpdate::default().status(status);
        if engine.update_combatant(side, character, update) {
            Ok(())
        } else {
            Err(format!("character {character} is not among the {side}"))
        }
    })?;

    println!(
        "  {}: {}",
        name_of(&store, character).bold(),
        or_dash(status)
    );
    Ok(())
}

pub fn join(
    ctx: &Context,
    id: u64,
    character: u64,
    side: &str,
    turn_order: Option<i32>,
) -> Result<(), String> {
    let side = Side::parse(side).ok_or_else(|| format!("unknown side: \"{side}\""))?;
    let character = CharacterId(character);

    let (store, order) = edit_battle(ctx, id, |store, engine| {
        let hp = ctx.visible_character(store, character)?.hp;
        let order = turn_order.unwrap_or_else(|| {
            engine
                .state()
                .combatants()
                .map(|(_, c)| c.turn_order)
                .max()
                .map_or(1, |max| max.saturating_add(1))
        });
        engine
            .add_combatant(side, BattleCharacterState::new(character, hp, order))
            .map_err(|e| e.to_string())?;
        Ok(order)
    })?;

    println!(
        "  {} joins the {side} (turn order {order})",
        name_of(&store, character).bold()
    );
    Ok(())
}

pub fn leave(ctx: &Context, id: u64, character: u64, side: Option<&str>) -> Result<(), String> {
    let character = CharacterId(character);

    let (store, side) = edit_battle(ctx, id, |_, engine| {
        let side = resolve_side(engine, BattleId(id), character, side)?;
        engine
            .remove_combatant(side, character)
            .map(|_| side)
            .ok_or_else(|| format!("character {character} is not among the {side}"))
    })?;

    println!("  {} leaves the {side}", name_of(&store, character).bold());
    Ok(())
}

pub fn delete(ctx: &Context, id: u64) -> Result<(), String> {
    let mut store = ctx.load()?;
    let id = BattleId(id);
    owned_battle(ctx, &store, id)?;

    store.delete_battle(id);
    ctx.save(&store)?;
    println!("  Deleted battle #{id}");
    Ok(())
}
