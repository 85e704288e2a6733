//! Seeding a battle from team rosters.

use tracing::{debug, warn};
use tt_core::{
    BattleCharacterState, BattleId, BattleState, Character, CharacterId, CoreError, NewBattle,
    Side, Store, Team, TeamId, UserId,
};

use crate::error::MechResult;

/// Build the rosters for a new battle.
///
/// Each resolvable member starts at its template's maximum hit points.
/// Turn order is assigned 1, 2, 3… by descending initiative across both
/// sides, ties going to the earlier roster position (allies first).
/// Members whose template is missing are skipped, as is any opponent who
/// already fights for the allies.
pub fn build_battle_state<'c, F>(allies: &Team, opponents: Option<&Team>, lookup: F) -> BattleState
where
    F: Fn(CharacterId) -> Option<&'c Character>,
{
    let mut seated: Vec<(Side, &Character)> = Vec::new();
    let rosters = [(Side::Allies, Some(allies)), (Side::Opponents, opponents)];

    for (side, team) in rosters {
        let Some(team) = team else { continue };
        for &id in &team.character_ids {
            if seated.iter().any(|(_, c)| c.id == id) {
                warn!(%id, team = %team.name, "character already seated, skipping");
                continue;
            }
            match lookup(id) {
                Some(character) => seated.push((side, character)),
                None => warn!(%id, team = %team.name, "character template missing, skipping"),
            }
        }
    }

    let mut by_initiative: Vec<usize> = (0..seated.len()).collect();
    by_initiative.sort_by_key(|&i| std::cmp::Reverse(seated[i].1.initiative));
    let mut turn_orders = vec![0i32; seated.len()];
    for (position, &i) in by_initiative.iter().enumerate() {
        turn_orders[i] = i32::try_from(position + 1).unwrap_or(i32::MAX);
    }

    let mut state = BattleState::default();
    for ((side, character), turn_order) in seated.into_iter().zip(turn_orders) {
        state
            .roster_mut(side)
            .push(BattleCharacterState::new(character.id, character.hp, turn_order));
    }
    debug!(
        allies = state.allies.len(),
        opponents = state.opponents.len(),
        "built battle state"
    );
    state
}

/// Create a battle in the store from an ally team and an optional opponent
/// team, both of which must exist.
pub fn start_battle(
    store: &mut Store,
    owner: UserId,
    name: &str,
    team: TeamId,
    opponent_team: Option<TeamId>,
) -> MechResult<BattleId> {
    let allies = store.team(team).ok_or(CoreError::TeamNotFound(team))?;
    let opponents = match opponent_team {
        Some(id) => Some(store.team(id).ok_or(CoreError::TeamNotFound(id))?),
        None => None,
    };
    let state = build_battle_state(allies, opponents, |id| store.character(id));

    let mut new = NewBattle::new(name);
    new.team_id = Some(team);
    new.opponent_team_id = opponent_team;
    new.battle_state = state;
    Ok(store.create_battle(owner, new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::NewCharacter;

    const OWNER: UserId = UserId(1);

    fn add(store: &mut Store, name: &str, hp: u32, initiative: i32) -> CharacterId {
        store
            .create_character(OWNER, NewCharacter::new(name, hp).with_initiative(initiative))
            .unwrap()
    }

    fn order_of(state: &BattleState, side: Side) -> Vec<(u64, i32)> {
        state
            .roster(side)
            .iter()
            .map(|c| (c.character_id.0, c.turn_order))
            .collect()
    }

    #[test]
    fn turn_order_by_descending_initiative() {
        let mut store = Store::new();
        let kael = add(&mut store, "Kael", 24, 2);
        let mira = add(&mut store, "Mira", 18, 5);
        let goblin = add(&mut store, "Goblin", 7, 3);
        let ogre = add(&mut store, "Ogre", 40, -1);
        let heroes = store.create_team(OWNER, "Heroes", &[kael, mira]).unwrap();
        let monsters = store.create_team(OWNER, "Monsters", &[goblin, ogre]).unwrap();

        let state = build_battle_state(
            store.team(heroes).unwrap(),
            store.team(monsters).unwrap().into(),
            |id| store.character(id),
        );
        assert_eq!(order_of(&state, Side::Allies), vec![(1, 3), (2, 1)]);
        assert_eq!(order_of(&state, Side::Opponents), vec![(3, 2), (4, 4)]);
        assert_eq!(state.allies[0].current_hp, 24);
        assert_eq!(state.opponents[1].current_hp, 40);
        assert!(state.allies.iter().all(|c| c.status.is_empty()));
    }

    #[test]
    fn ties_go_to_earlier_roster_position() {
        let mut store = Store::new();
        let a = add(&mut store, "A", 5, 1);
        let b = add(&mut store, "B", 5, 1);
        let c = add(&mut store, "C", 5, 1);
        let left = store.create_team(OWNER, "Left", &[a, b]).unwrap();
        let right = store.create_team(OWNER, "Right", &[c]).unwrap();
        let state = build_battle_state(
            store.team(left).unwrap(),
            store.team(right).unwrap().into(),
            |id| store.character(id),
        );
        assert_eq!(order_of(&state, Side::Allies), vec![(1, 1), (2, 2)]);
        assert_eq!(order_of(&state, Side::Opponents), vec![(3, 3)]);
    }

    #[test]
    fn dangling_and_shared_members_are_skipped() {
        let mut store = Store::new();
        let kael = add(&mut store, "Kael", 24, 2);
        let ghost = add(&mut store, "Ghost", 1, 9);
        let goblin = add(&mut store, "Goblin", 7, 3);
        let heroes = store.create_team(OWNER, "Heroes", &[kael, ghost]).unwrap();
        let monsters = store.create_team(OWNER, "Monsters", &[kael, goblin]).unwrap();
        store.delete_character(ghost);

        let state = build_battle_state(
            store.team(heroes).unwrap(),
            store.team(monsters).unwrap().into(),
            |id| store.character(id),
        );
        assert_eq!(order_of(&state, Side::Allies), vec![(1, 2)]);
        assert_eq!(order_of(&state, Side::Opponents), vec![(3, 1)]);
    }

    #[test]
    fn allies_only() {
        let mut store = Store::new();
        let kael = add(&mut store, "Kael", 24, 2);
        let heroes = store.create_team(OWNER, "Heroes", &[kael]).unwrap();
        let state = build_battle_state(store.team(heroes).unwrap(), None, |id| {
            store.character(id)
        });
        assert_eq!(state.allies.len(), 1);
        assert!(state.opponents.is_empty());
    }

    #[test]
    fn start_battle_stores_rosters() {
        let mut store = Store::new();
        let kael = add(&mut store, "Kael", 24, 2);
        let goblin = add(&mut store, "Goblin", 7, 3);
        let heroes = store.create_team(OWNER, "Heroes", &[kael]).unwrap();
        let monsters = store.create_team(OWNER, "Monsters", &[goblin]).unwrap();

        let id = start_battle(&mut store, OWNER, "Ambush", heroes, Some(monsters)).unwrap();
        let battle = store.battle(id).unwrap();
        assert_eq!(battle.name, "Ambush");
        assert_eq!(battle.current_turn, 1);
        assert_eq!(battle.team_id, Some(heroes));
        assert_eq!(battle.opponent_team_id, Some(monsters));
        assert_eq!(battle.battle_state.len(), 2);
    }

    #[test]
    fn start_battle_requires_teams() {
        let mut store = Store::new();
        let heroes = store.create_team(OWNER, "Heroes", &[]).unwrap();
        assert!(start_battle(&mut store, OWNER, "Ambush", TeamId(9), None).is_err());
        assert!(start_battle(&mut store, OWNER, "Ambush", heroes, Some(TeamId(9))).is_err());
        assert!(store.battles(None).is_empty());
    }
}
