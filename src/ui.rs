use crate::catalog::RoleCatalog;
use crate::classifier::ResolutionResult;
use crate::fonts::{MONO_BOLD_FONT_PATH, MONO_FONT_PATH};
use crate::reveal::{RevealSlot, SecondaryGate, Typewriter};
use crate::roast::generate;
use crate::session::Session;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use bevy_persistent::prelude::*;

pub const TEXT_COLOR: Color = Color::Oklcha(Oklcha::new(0.92, 0.012, 106.0, 1.0));
pub const ACCENT_COLOR: Color = Color::Oklcha(Oklcha::new(0.82, 0.17, 145.0, 1.0));
pub const ERROR_COLOR: Color = Color::Oklcha(Oklcha::new(0.65, 0.21, 27.0, 1.0));
pub const OUTLINE_COLOR: Color = Color::Oklcha(Oklcha::new(0.55, 0.01, 280.0, 1.0));
pub const PANEL_COLOR: Color = Color::Oklcha(Oklcha::new(0.22, 0.012, 288.0, 1.0));
pub const BACKGROUND_COLOR: Color = Color::Oklcha(Oklcha::new(0.16, 0.01, 288.0, 1.0));

const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Title,
    Analyzing,
    Result,
}

/// All three screens: title (input capture), analyzing interstitial,
/// result (reveal). The reveal machinery itself lives in `reveal.rs`;
/// this module only spawns/despawns the entities that carry it.
pub struct ScreenPlugin;
impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.insert_state(AppState::Title)
            .insert_resource(JobTitleInput(String::new()))
            .add_systems(OnEnter(AppState::Title), spawn_title_screen)
            .add_systems(OnExit(AppState::Title), despawn_all::<TitleScreen>)
            .add_systems(
                Update,
                (capture_typed_input, trending_click, sync_input_field)
                    .run_if(in_state(AppState::Title)),
            )
            .add_systems(OnEnter(AppState::Analyzing), spawn_analyzing_screen)
            .add_systems(OnExit(AppState::Analyzing), despawn_all::<AnalyzingScreen>)
            .add_systems(OnEnter(AppState::Result), spawn_result_screen)
            // despawning the reveal entities drops all pending timers
            .add_systems(OnExit(AppState::Result), despawn_all::<ResultScreen>)
            .add_systems(Update, return_to_title.run_if(in_state(AppState::Result)));
    }
}

/// What the user has typed so far on the title screen.
#[derive(Resource, Debug, Default)]
pub struct JobTitleInput(pub String);

#[derive(Component)]
struct TitleScreen;

#[derive(Component)]
struct AnalyzingScreen;

#[derive(Component)]
struct ResultScreen;

#[derive(Component)]
struct InputFieldText;

#[derive(Component)]
struct SuggestionText;

#[derive(Component)]
struct TrendingRole(&'static str);

const TRENDING_ROLES: [&str; 5] = [
    "Influencer",
    "Software Engineer",
    "Graphic Designer",
    "Customer Service",
    "Writer",
];

fn despawn_all<C: Component>(entities: Query<Entity, With<C>>, mut commands: Commands) {
    for ent in &entities {
        commands.entity(ent).despawn();
    }
}

fn spawn_title_screen(
    mut commands: Commands,
    server: Res<AssetServer>,
    mut input: ResMut<JobTitleInput>,
) {
    input.0.clear();

    commands.spawn((
        TitleScreen,
        Node {
            position_type: PositionType::Absolute,
            width: vw(100),
            height: vh(100),
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: px(14),
            ..default()
        },
        children![
            (
                Text::new("THE LAYOFF ORACLE"),
                TextColor(TEXT_COLOR),
                TextFont {
                    font: server.load(MONO_BOLD_FONT_PATH),
                    font_size: 44.0,
                    ..default()
                },
            ),
            (
                Text::new("Your job called. It's terminal."),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_FONT_PATH),
                    font_size: 18.0,
                    ..default()
                },
            ),
            (
                Node {
                    margin: UiRect::top(px(24)),
                    padding: UiRect::axes(px(24), px(16)),
                    display: Display::Flex,
                    flex_direction: FlexDirection::Column,
                    row_gap: px(8),
                    min_width: px(460),
                    ..default()
                },
                BackgroundColor(PANEL_COLOR),
                children![
                    (
                        Text::new("INPUT JOB TITLE / ROLE"),
                        TextColor(OUTLINE_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 12.0,
                            ..default()
                        },
                    ),
                    (
                        Text::new("_"),
                        InputFieldText,
                        TextColor(TEXT_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 22.0,
                            ..default()
                        },
                    ),
                    (
                        Text::new(""),
                        SuggestionText,
                        TextColor(OUTLINE_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 12.0,
                            ..default()
                        },
                    ),
                ],
            ),
            (
                Text::new("TYPE YOUR ROLE, THEN ENTER TO INITIATE ANALYSIS"),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_FONT_PATH),
                    font_size: 12.0,
                    ..default()
                },
            ),
        ],
    ));

    // trending shortcuts, top left like a sidebar
    commands
        .spawn((
            TitleScreen,
            Node {
                position_type: PositionType::Absolute,
                top: px(24),
                left: px(24),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: px(4),
                ..default()
            },
            children![(
                Text::new("TRENDING JOBS"),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_BOLD_FONT_PATH),
                    font_size: 12.0,
                    ..default()
                },
            )],
        ))
        .with_children(|parent| {
            for role in TRENDING_ROLES {
                parent.spawn((
                    Button,
                    TrendingRole(role),
                    Node {
                        padding: UiRect::axes(px(4), px(2)),
                        ..default()
                    },
                    children![(
                        Text::new(role.to_uppercase()),
                        TextColor(OUTLINE_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 12.0,
                            ..default()
                        },
                    )],
                ));
            }
        });
}

// first letter gets capitalized, same treatment the original gave typed input
fn push_char(buffer: &mut String, ch: char) {
    if buffer.is_empty() {
        buffer.extend(ch.to_uppercase());
    } else {
        buffer.push(ch);
    }
}

fn capture_typed_input(
    mut keys: MessageReader<KeyboardInput>,
    mut input: ResMut<JobTitleInput>,
    mut session: ResMut<Persistent<Session>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for key in keys.read() {
        if key.state == ButtonState::Released {
            continue;
        }
        match &key.logical_key {
            Key::Character(typed) => {
                for ch in typed.chars() {
                    if !ch.is_control() {
                        push_char(&mut input.0, ch);
                    }
                }
            }
            Key::Space => {
                if !input.0.is_empty() {
                    input.0.push(' ');
                }
            }
            Key::Backspace => {
                input.0.pop();
            }
            Key::Enter => {
                let title = input.0.trim().to_string();
                if !title.is_empty() {
                    store_and_analyze(title, &mut session, &mut next_state);
                }
            }
            _ => {}
        }
    }
}

fn trending_click(
    interactions: Query<(&Interaction, &TrendingRole), Changed<Interaction>>,
    mut session: ResMut<Persistent<Session>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (interaction, role) in &interactions {
        if *interaction == Interaction::Pressed {
            store_and_analyze(role.0.to_string(), &mut session, &mut next_state);
        }
    }
}

fn store_and_analyze(
    title: String,
    session: &mut Persistent<Session>,
    next_state: &mut NextState<AppState>,
) {
    session.job_title = Some(title);
    session.resolution = None;
    if let Err(err) = session.persist() {
        warn!("failed to persist session: {err}");
    }
    next_state.set(AppState::Analyzing);
}

fn sync_input_field(
    input: Res<JobTitleInput>,
    catalog: Res<RoleCatalog>,
    mut field: Query<&mut Text, (With<InputFieldText>, Without<SuggestionText>)>,
    mut suggestions: Query<&mut Text, (With<SuggestionText>, Without<InputFieldText>)>,
) {
    if !input.is_changed() {
        return;
    }
    for mut text in &mut field {
        text.0 = format!("{}_", input.0);
    }

    let folded = input.0.to_lowercase();
    let line = if folded.is_empty() {
        String::new()
    } else {
        let mut matches: Vec<&str> = catalog
            .all_terms()
            .into_iter()
            .filter(|term| term.to_lowercase().contains(&folded))
            .collect();
        matches.dedup();
        matches.truncate(MAX_SUGGESTIONS);
        matches.join("  ·  ")
    };
    for mut text in &mut suggestions {
        text.0 = line.clone();
    }
}

fn spawn_analyzing_screen(mut commands: Commands, server: Res<AssetServer>) {
    commands.spawn((
        AnalyzingScreen,
        Node {
            position_type: PositionType::Absolute,
            width: vw(100),
            height: vh(100),
            display: Display::Flex,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        children![(
            Text::new("CALCULATING DEMISE..."),
            TextColor(ACCENT_COLOR),
            TextFont {
                font: server.load(MONO_BOLD_FONT_PATH),
                font_size: 26.0,
                ..default()
            },
        )],
    ));
}

fn spawn_result_screen(
    mut commands: Commands,
    server: Res<AssetServer>,
    catalog: Res<RoleCatalog>,
    mut session: ResMut<Persistent<Session>>,
) {
    let raw_title = session.job_title.clone().unwrap_or_default();

    // consume the cached result so back-navigation can't replay it;
    // recompute locally if we somehow got here without one
    let resolution = session.take_resolution().unwrap_or_else(|| {
        crate::classifier::resolve(
            &catalog,
            &raw_title,
            Ok(crate::catalog::RoleKey::default_key()),
        )
    });
    if let Err(err) = session.persist() {
        warn!("failed to persist session: {err}");
    }

    let ResolutionResult {
        matched_role,
        is_safe,
    } = resolution;
    let message = generate(&catalog, &matched_role, is_safe, &mut rand::rng());

    let headline = if is_safe {
        "YOU WIN CAPITALISM"
    } else {
        "YOUR CAREER HAS BEEN LAID OFF"
    };
    let headline_color = if is_safe { ACCENT_COLOR } else { ERROR_COLOR };

    let show_archetype = !matched_role.is_default()
        && matched_role.as_str().to_lowercase() != raw_title.trim().to_lowercase();
    let archetype_line = if show_archetype {
        format!(
            "DETECTED ARCHETYPE: {}",
            matched_role.as_str().to_uppercase()
        )
    } else {
        String::new()
    };

    commands.spawn((
        ResultScreen,
        Node {
            position_type: PositionType::Absolute,
            width: vw(100),
            height: vh(100),
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: px(10),
            padding: UiRect::axes(vw(12), px(0)),
            ..default()
        },
        children![
            (
                Text::new(headline),
                TextColor(headline_color),
                TextFont {
                    font: server.load(MONO_BOLD_FONT_PATH),
                    font_size: 34.0,
                    ..default()
                },
            ),
            (
                Text::new(format!("SUBJECT: {}", raw_title.to_uppercase())),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_FONT_PATH),
                    font_size: 14.0,
                    ..default()
                },
            ),
            (
                Text::new(archetype_line),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_FONT_PATH),
                    font_size: 12.0,
                    ..default()
                },
            ),
            (
                Node {
                    margin: UiRect::top(px(16)),
                    padding: UiRect::all(px(24)),
                    display: Display::Flex,
                    flex_direction: FlexDirection::Column,
                    row_gap: px(12),
                    max_width: px(720),
                    ..default()
                },
                BackgroundColor(PANEL_COLOR),
                children![
                    (
                        Text::new("ANALYSIS COMPLETE."),
                        TextColor(ACCENT_COLOR),
                        TextFont {
                            font: server.load(MONO_BOLD_FONT_PATH),
                            font_size: 14.0,
                            ..default()
                        },
                    ),
                    (
                        Text::new(""),
                        Typewriter::new(message.primary.clone()),
                        RevealSlot::Primary,
                        TextColor(TEXT_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 18.0,
                            ..default()
                        },
                    ),
                    (
                        Text::new(""),
                        Typewriter::idle(),
                        RevealSlot::Secondary,
                        match &message.secondary {
                            Some(cost_line) => SecondaryGate::holding(cost_line.clone()),
                            None => SecondaryGate::empty(),
                        },
                        TextColor(ERROR_COLOR),
                        TextFont {
                            font: server.load(MONO_FONT_PATH),
                            font_size: 13.0,
                            ..default()
                        },
                    ),
                ],
            ),
            (
                Text::new("ENTER — ONE MORE FOR THE TIMELINE"),
                TextColor(OUTLINE_COLOR),
                TextFont {
                    font: server.load(MONO_FONT_PATH),
                    font_size: 12.0,
                    ..default()
                },
            ),
        ],
    ));
}

fn return_to_title(
    input: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if input.just_pressed(KeyCode::Enter) || input.just_pressed(KeyCode::Escape) {
        next_state.set(AppState::Title);
    }
}
