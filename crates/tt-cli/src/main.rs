//! CLI frontend for tabletop dice rolls, characters, teams, and battles.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tt_core::{Ability, NewCharacter, UserId};

use commands::Context;

#[derive(Parser)]
#[command(
    name = "tt",
    about = "Tabletop companion: dice formulas, characters, teams, and battles",
    version,
    propagate_version = true
)]
struct Cli {
    /// JSON file holding characters, teams, and battles
    #[arg(long, global = true, default_value = "tabletop.json")]
    store: PathBuf,

    /// ID of the acting user
    #[arg(long, global = true, default_value = "1")]
    user: u64,

    /// RNG seed for reproducible rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice formula such as 2d6+3 (or one of each common die)
    Roll {
        /// Formula or die tag (e.g. 2d6+3, 1d20-1, d8)
        #[arg(allow_hyphen_values = true)]
        formula: Option<String>,
    },

    /// Manage character templates
    Character {
        #[command(subcommand)]
        action: CharacterCommand,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },

    /// Run battles
    Battle {
        #[command(subcommand)]
        action: BattleCommand,
    },
}

#[derive(Subcommand)]
enum CharacterCommand {
    /// Create a character
    Add {
        /// Character name
        name: String,

        /// Maximum hit points
        #[arg(long)]
        hp: u32,

        /// Armor class
        #[arg(long, default_value = "10")]
        ac: u32,

        /// Movement speed
        #[arg(long, default_value = "30")]
        speed: u32,

        /// Initiative bonus
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        initiative: i32,

        /// Tag (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Make the template visible to other users
        #[arg(long)]
        public: bool,
    },

    /// List your characters
    List {
        /// List public characters of all users instead
        #[arg(long)]
        public: bool,

        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show a character and its abilities
    Show {
        /// Character ID
        id: u64,
    },

    /// Delete a character
    Delete {
        /// Character ID
        id: u64,
    },

    /// Attach an ability to a character
    Ability {
        /// Character ID
        id: u64,

        /// Ability ID, unique within the character
        ability: String,

        /// Display name (default: the ability ID)
        #[arg(long)]
        name: Option<String>,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Damage formula, e.g. 1d8+3
        #[arg(long)]
        damage: Option<String>,

        /// Range
        #[arg(long)]
        range: Option<String>,

        /// Effect text
        #[arg(long)]
        effect: Option<String>,

        /// Mark the ability as passive
        #[arg(long)]
        passive: bool,
    },
}

#[derive(Subcommand)]
enum TeamCommand {
    /// Create a team from character IDs
    Create {
        /// Team name
        name: String,

        /// Member character IDs
        members: Vec<u64>,
    },

    /// List your teams
    List,

    /// Show a team roster
    Show {
        /// Team ID
        id: u64,
    },

    /// Add a character to a team
    Add {
        /// Team ID
        team: u64,

        /// Character ID
        character: u64,
    },

    /// Remove a character from a team
    Remove {
        /// Team ID
        team: u64,

        /// Character ID
        character: u64,
    },

    /// Select (or deselect) an ability for a team member
    Select {
        /// Team ID
        team: u64,

        /// Character ID
        character: u64,

        /// Ability ID
        ability: String,

        /// Drop the selection instead
        #[arg(long)]
        off: bool,
    },

    /// Delete a team
    Delete {
        /// Team ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum BattleCommand {
    /// Start a battle from an ally team and an optional opponent team
    Start {
        /// Battle name
        name: String,

        /// Ally team ID
        #[arg(long)]
        team: u64,

        /// Opponent team ID
        #[arg(long)]
        opponents: Option<u64>,
    },

    /// List your battles
    List,

    /// Show both rosters with the active combatant marked
    Show {
        /// Battle ID
        id: u64,
    },

    /// Advance to the next turn
    Next {
        /// Battle ID
        id: u64,
    },

    /// Set (12) or adjust (+3, -4) a combatant's hit points
    Hp {
        /// Battle ID
        id: u64,

        /// Character ID
        character: u64,

        /// New value, or a signed change
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Side of the combatant (allies or opponents)
        #[arg(long)]
        side: Option<String>,
    },

    /// Set a combatant's status label (empty to clear)
    Status {
        /// Battle ID
        id: u64,

        /// Character ID
        character: u64,

        /// Status label
        status: String,

        /// Side of the combatant (allies or opponents)
        #[arg(long)]
        side: Option<String>,
    },

    /// Bring a character into a running battle
    Join {
        /// Battle ID
        id: u64,

        /// Character ID
        character: u64,

        /// Side to join (allies or opponents)
        #[arg(long, default_value = "allies")]
        side: String,

        /// Turn order (default: after everyone else)
        #[arg(long, allow_negative_numbers = true)]
        order: Option<i32>,
    },

    /// Take a combatant out of a battle
    Leave {
        /// Battle ID
        id: u64,

        /// Character ID
        character: u64,

        /// Side of the combatant (allies or opponents)
        #[arg(long)]
        side: Option<String>,
    },

    /// Delete a battle
    Delete {
        /// Battle ID
        id: u64,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(&cli.store, UserId(cli.user));

    let result = match cli.command {
        Commands::Roll { formula } => commands::roll::run(formula.as_deref(), cli.seed),
        Commands::Character { action } => run_character(&ctx, action),
        Commands::Team { action } => run_team(&ctx, action),
        Commands::Battle { action } => run_battle(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run_character(ctx: &Context, action: CharacterCommand) -> Result<(), String> {
    use commands::character;

    match action {
        CharacterCommand::Add {
            name,
            hp,
            ac,
            speed,
            initiative,
            tag,
            public,
        } => {
            let mut new = NewCharacter::new(name, hp)
                .with_ac(ac)
                .with_initiative(initiative);
            new.speed = speed;
            new.tags = tag;
            new.is_public = public;
            character::add(ctx, new)
        }
        CharacterCommand::List { public, tag } => character::list(ctx, public, tag.as_deref()),
        CharacterCommand::Show { id } => character::show(ctx, id),
        CharacterCommand::Delete { id } => character::delete(ctx, id),
        CharacterCommand::Ability {
            id,
            ability,
            name,
            description,
            damage,
            range,
            effect,
            passive,
        } => {
            let display_name = name.unwrap_or_else(|| ability.clone());
            let mut new = Ability::new(ability, display_name);
            new.description = description;
            new.damage = damage;
            new.range = range;
            new.effect = effect;
            new.is_passive = passive;
            character::ability(ctx, id, new)
        }
    }
}

fn run_team(ctx: &Context, action: TeamCommand) -> Result<(), String> {
    use commands::team;

    match action {
        TeamCommand::Create { name, members } => team::create(ctx, &name, &members),
        TeamCommand::List => team::list(ctx),
        TeamCommand::Show { id } => team::show(ctx, id),
        TeamCommand::Add { team, character } => team::add(ctx, team, character),
        TeamCommand::Remove { team, character } => team::remove(ctx, team, character),
        TeamCommand::Select {
            team,
            character,
            ability,
            off,
        } => team::select(ctx, team, character, &ability, off),
        TeamCommand::Delete { id } => team::delete(ctx, id),
    }
}

fn run_battle(ctx: &Context, action: BattleCommand) -> Result<(), String> {
    use commands::battle;

    match action {
        BattleCommand::Start {
            name,
            team,
            opponents,
        } => battle::start(ctx, &name, team, opponents),
        BattleCommand::List => battle::list(ctx),
        BattleCommand::Show { id } => battle::show(ctx, id),
        BattleCommand::Next { id } => battle::next(ctx, id),
        BattleCommand::Hp {
            id,
            character,
            value,
            side,
        } => battle::hp(ctx, id, character, &value, side.as_deref()),
        BattleCommand::Status {
            id,
            character,
            status,
            side,
        } => battle::status(ctx, id, character, &status, side.as_deref()),
        BattleCommand::Join {
            id,
            character,
            side,
            order,
        } => battle::join(ctx, id, character, &side, order),
        BattleCommand::Leave {
            id,
            character,
            side,
        } => battle::leave(ctx, id, character, side.as_deref()),
        BattleCommand::Delete { id } => battle::delete(ctx, id),
    }
}
