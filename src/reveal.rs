use bevy::prelude::*;

/// Seconds per revealed character. 30ms reads like a busy terminal.
pub const CHAR_DELAY: f32 = 0.03;
/// Pause between the primary roast finishing and the cost line starting.
pub const SECONDARY_START_DELAY: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Revealing,
    Done,
}

/// Which message slot a typewriter drives. There are exactly two per
/// result: the roast and the replacement-cost line.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealSlot {
    Primary,
    Secondary,
}

/// Fired once per typewriter when its full text is on screen.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealFinished(pub RevealSlot);

/// Character-by-character reveal state machine for one message slot.
///
/// `Idle` until non-empty text is present, then `Revealing` one char per
/// `CHAR_DELAY` of accumulated time, then `Done`. Swapping in new text
/// resets everything, so the old reveal can never write again — that reset
/// is the cancellation path; there's no separate timer handle to leak.
#[derive(Component, Debug, Clone)]
pub struct Typewriter {
    full_text: String,
    revealed: usize,
    acc: f32,
    phase: RevealPhase,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Typewriter {
            full_text: text.into(),
            revealed: 0,
            acc: 0.0,
            phase: RevealPhase::Idle,
        }
    }

    /// A slot with no text yet (secondary before its gate opens).
    pub fn idle() -> Self {
        Typewriter::new("")
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RevealPhase::Done
    }

    /// Currently revealed prefix, on a char boundary.
    pub fn visible_text(&self) -> &str {
        match self.full_text.char_indices().nth(self.revealed) {
            Some((byte_pos, _)) => &self.full_text[..byte_pos],
            None => &self.full_text,
        }
    }

    /// Replace the text and restart from scratch. Called mid-reveal this
    /// cancels the in-flight animation with zero carry-over.
    pub fn restart(&mut self, text: impl Into<String>) {
        self.full_text = text.into();
        self.revealed = 0;
        self.acc = 0.0;
        self.phase = RevealPhase::Idle;
    }

    /// Advance by `delta` seconds. Returns true exactly once, on the tick
    /// that finishes the reveal.
    pub fn tick(&mut self, delta: f32) -> bool {
        match self.phase {
            RevealPhase::Done => return false,
            RevealPhase::Idle => {
                if self.full_text.is_empty() {
                    return false;
                }
                self.phase = RevealPhase::Revealing;
                self.acc = 0.0;
            }
            RevealPhase::Revealing => {}
        }

        let total = self.full_text.chars().count();
        self.acc += delta;
        while self.acc >= CHAR_DELAY && self.revealed < total {
            self.acc -= CHAR_DELAY;
            self.revealed += 1;
        }

        if self.revealed >= total {
            self.phase = RevealPhase::Done;
            return true;
        }
        false
    }
}

/// Holds the secondary text until the primary is done and the fixed delay
/// has passed. Pure so the gating rules are testable without a schedule.
#[derive(Component, Debug, Clone)]
pub struct SecondaryGate {
    pending: Option<String>,
    delay_left: f32,
    armed: bool,
}

impl SecondaryGate {
    pub fn holding(text: impl Into<String>) -> Self {
        SecondaryGate {
            pending: Some(text.into()),
            delay_left: SECONDARY_START_DELAY,
            armed: false,
        }
    }

    /// Gate with nothing to release (safe roles).
    pub fn empty() -> Self {
        SecondaryGate {
            pending: None,
            delay_left: SECONDARY_START_DELAY,
            armed: false,
        }
    }

    /// Primary finished; start counting down.
    pub fn arm(&mut self) {
        if self.pending.is_some() {
            self.armed = true;
        }
    }

    /// Advance the countdown. Yields the held text exactly once, when the
    /// gate is armed and the delay has elapsed.
    pub fn tick(&mut self, delta: f32) -> Option<String> {
        if !self.armed {
            return None;
        }
        self.delay_left -= delta;
        if self.delay_left <= 0.0 {
            self.armed = false;
            return self.pending.take();
        }
        None
    }
}

pub struct RevealPlugin;
impl Plugin for RevealPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<RevealFinished>().add_systems(
            Update,
            (tick_typewriters, open_secondary_gates, sync_reveal_text).chain(),
        );
    }
}

fn tick_typewriters(
    time: Res<Time>,
    mut typewriters: Query<(&mut Typewriter, &RevealSlot)>,
    mut finished: MessageWriter<RevealFinished>,
) {
    for (mut typewriter, slot) in &mut typewriters {
        if typewriter.tick(time.delta_secs()) {
            finished.write(RevealFinished(*slot));
        }
    }
}

fn open_secondary_gates(
    time: Res<Time>,
    mut finished: MessageReader<RevealFinished>,
    mut gates: Query<(&mut Typewriter, &mut SecondaryGate)>,
) {
    for event in finished.read() {
        if event.0 == RevealSlot::Primary {
            for (_, mut gate) in &mut gates {
                gate.arm();
            }
        }
    }
    for (mut typewriter, mut gate) in &mut gates {
        if let Some(text) = gate.tick(time.delta_secs()) {
            typewriter.restart(text);
        }
    }
}

/// Push each typewriter's prefix into its `Text`, with a block cursor
/// while it's typing.
fn sync_reveal_text(mut texts: Query<(&Typewriter, &mut Text)>) {
    for (typewriter, mut text) in &mut texts {
        let visible = typewriter.visible_text();
        match typewriter.phase() {
            RevealPhase::Revealing => text.0 = format!("{visible}█"),
            _ => {
                if text.0 != visible {
                    text.0 = visible.to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_prefix_per_tick_in_order() {
        let text = "DOOMED";
        let mut tw = Typewriter::new(text);
        let mut prefixes = vec![tw.visible_text().to_string()];

        while !tw.is_done() {
            tw.tick(CHAR_DELAY);
            let current = tw.visible_text().to_string();
            if Some(&current) != prefixes.last() {
                prefixes.push(current);
            }
        }

        // N+1 states, strictly increasing, final state exact
        assert_eq!(prefixes.len(), text.chars().count() + 1);
        for pair in prefixes.windows(2) {
            assert!(pair[1].len() > pair[0].len());
            assert!(pair[1].starts_with(pair[0].as_str()));
        }
        assert_eq!(prefixes.first().unwrap(), "");
        assert_eq!(prefixes.last().unwrap(), text);
    }

    #[test]
    fn finished_signal_fires_exactly_once() {
        let mut tw = Typewriter::new("ab");
        let mut signals = 0;
        for _ in 0..20 {
            if tw.tick(CHAR_DELAY) {
                signals += 1;
            }
        }
        assert_eq!(signals, 1);
        assert!(tw.is_done());
    }

    #[test]
    fn empty_text_stays_idle() {
        let mut tw = Typewriter::idle();
        for _ in 0..10 {
            assert!(!tw.tick(CHAR_DELAY));
        }
        assert_eq!(tw.phase(), RevealPhase::Idle);
        assert_eq!(tw.visible_text(), "");
    }

    #[test]
    fn restart_mid_reveal_leaks_no_stale_characters() {
        let mut tw = Typewriter::new("OLD MESSAGE");
        for _ in 0..4 {
            tw.tick(CHAR_DELAY);
        }
        assert!(!tw.visible_text().is_empty());

        tw.restart("NEW");
        assert_eq!(tw.phase(), RevealPhase::Idle);
        assert_eq!(tw.visible_text(), "");

        let mut seen = Vec::new();
        while !tw.is_done() {
            tw.tick(CHAR_DELAY);
            seen.push(tw.visible_text().to_string());
        }
        for prefix in &seen {
            assert!(
                "NEW".starts_with(prefix.as_str()),
                "stale prefix `{prefix}`"
            );
        }
        assert_eq!(tw.visible_text(), "NEW");
    }

    #[test]
    fn restart_with_empty_text_cancels_outright() {
        let mut tw = Typewriter::new("SOMETHING");
        tw.tick(CHAR_DELAY);
        tw.restart("");
        for _ in 0..10 {
            assert!(!tw.tick(CHAR_DELAY));
        }
        assert_eq!(tw.phase(), RevealPhase::Idle);
    }

    #[test]
    fn slow_ticks_accumulate_instead_of_dropping_time() {
        let mut tw = Typewriter::new("abcd");
        // half-delay ticks: a char every second tick
        tw.tick(CHAR_DELAY / 2.0);
        assert_eq!(tw.visible_text(), "");
        tw.tick(CHAR_DELAY / 2.0);
        assert_eq!(tw.visible_text(), "a");
    }

    #[test]
    fn multibyte_text_reveals_on_char_boundaries() {
        let mut tw = Typewriter::new("héllo");
        tw.tick(CHAR_DELAY);
        assert_eq!(tw.visible_text(), "h");
        tw.tick(CHAR_DELAY);
        assert_eq!(tw.visible_text(), "hé");
    }

    #[test]
    fn gate_stays_shut_until_armed_and_delayed() {
        let mut gate = SecondaryGate::holding("COST LINE");

        // unarmed: no amount of time opens it
        assert_eq!(gate.tick(10.0), None);

        gate.arm();
        assert_eq!(gate.tick(SECONDARY_START_DELAY / 2.0), None);
        assert_eq!(
            gate.tick(SECONDARY_START_DELAY).as_deref(),
            Some("COST LINE")
        );
        // released exactly once
        gate.arm();
        assert_eq!(gate.tick(10.0), None);
    }

    #[test]
    fn empty_gate_never_opens() {
        let mut gate = SecondaryGate::empty();
        gate.arm();
        assert_eq!(gate.tick(10.0), None);
    }
}
