//! Chat command layer: parses command text and turns each command into one
//! load-compute-save transaction against a [`CycleStore`], answering with
//! reply text.

use crate::allocator;
use crate::config::Config;
use crate::cycle::{requires_confirmation, Cycle, CyclePhase};
use crate::stage::{StageWeight, SONG_STAGES};
use crate::store::CycleStore;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    New {
        name: Option<String>,
        days: Option<String>,
        force: bool,
    },
    Status,
    Done {
        stage: String,
    },
    Plan {
        days: Option<String>,
    },
    Unknown(String),
}

static COMMAND_RE: OnceLock<Regex> = OnceLock::new();
static DAYS_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn command_re() -> &'static Regex {
    COMMAND_RE.get_or_init(|| {
        Regex::new(r"(?s)^/([A-Za-z_]+)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$").unwrap()
    })
}

fn days_token_re() -> &'static Regex {
    DAYS_TOKEN_RE.get_or_init(|| Regex::new(r"^[+-]?\d+$").unwrap())
}

impl Command {
    /// Parse a chat message. Anything that is not a known slash command
    /// becomes `Unknown`.
    pub fn parse(text: &str) -> Command {
        let text = text.trim();
        let Some(caps) = command_re().captures(text) else {
            return Command::Unknown(text.to_string());
        };
        let cmd = caps[1].to_lowercase();
        let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        match cmd.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "status" => Command::Status,
            "new" | "new_force" => {
                let (name, days) = split_name_and_days(args);
                Command::New {
                    name,
                    days,
                    force: cmd == "new_force",
                }
            }
            "done" | "complete" => Command::Done {
                stage: args.to_string(),
            },
            "plan" => Command::Plan {
                days: args.split_whitespace().next().map(str::to_string),
            },
            _ => Command::Unknown(text.to_string()),
        }
    }
}

/// `"Летняя песня 45"` → (`Some("Летняя песня")`, `Some("45")`).
/// Only a trailing integer-looking token is taken as the day count.
fn split_name_and_days(args: &str) -> (Option<String>, Option<String>) {
    let words: Vec<&str> = args.split_whitespace().collect();
    let (name_words, days) = match words.split_last() {
        Some((last, rest)) if days_token_re().is_match(last) => (rest, Some(last.to_string())),
        _ => (words.as_slice(), None),
    };
    let name = name_words.join(" ");
    let name = if name.is_empty() { None } else { Some(name) };
    (name, days)
}

// ---------------------------------------------------------------------------
// Day argument policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPolicy {
    pub default_days: u32,
    pub min_days: u32,
    pub max_days: u32,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self {
            default_days: 30,
            min_days: 7,
            max_days: 3650,
        }
    }
}

impl From<&Config> for CommandPolicy {
    fn from(config: &Config) -> Self {
        let min_days = config.min_days.max(1);
        Self {
            default_days: config.default_days,
            min_days,
            max_days: config.max_days.max(min_days),
        }
    }
}

/// Why the day count used differs from what the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayNote {
    Unparsed(String),
    RaisedToMinimum(i64),
    LoweredToMaximum(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDays {
    pub days: u32,
    pub note: Option<DayNote>,
}

impl CommandPolicy {
    /// Missing → default; unparseable → default with a note; supplied values
    /// outside `[min_days, max_days]` are clamped to the nearest bound.
    pub fn resolve_days(&self, raw: Option<&str>) -> ResolvedDays {
        let max_days = self.max_days.max(self.min_days);
        let fallback = self.default_days.clamp(self.min_days, max_days);
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return ResolvedDays {
                days: fallback,
                note: None,
            };
        };
        match raw.parse::<i64>() {
            Ok(n) if n < i64::from(self.min_days) => ResolvedDays {
                days: self.min_days,
                note: Some(DayNote::RaisedToMinimum(n)),
            },
            Ok(n) if n > i64::from(max_days) => ResolvedDays {
                days: max_days,
                note: Some(DayNote::LoweredToMaximum(n)),
            },
            Ok(n) => ResolvedDays {
                days: u32::try_from(n).unwrap_or(max_days),
                note: None,
            },
            Err(_) => ResolvedDays {
                days: fallback,
                note: Some(DayNote::Unparsed(raw.to_string())),
            },
        }
    }

    fn describe(&self, note: &DayNote, used: u32) -> String {
        match note {
            DayNote::Unparsed(raw) => {
                format!("Не понял число дней «{raw}», беру {used}.")
            }
            DayNote::RaisedToMinimum(n) => {
                format!("{n} дн. слишком мало, минимум {}. Ставлю {used}.", self.min_days)
            }
            DayNote::LoweredToMaximum(n) => {
                format!("{n} дн. слишком много, беру максимум {used}.")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

pub const GREETING: &str = "Привет, я бот-наставник Мнемоно. /status чтобы проверить цикл.";

pub const HELP: &str = "Команды:
/new <название> [дни] — начать новый цикл (по умолчанию 30 дней, минимум 7)
/new_force <название> [дни] — заменить текущий цикл
/status — где я сейчас
/done <этап> — отметить этап выполненным
/plan [дни] — показать разбивку без сохранения";

const SAVE_FAILED: &str = "⚠️ Не удалось сохранить состояние, попробуй ещё раз.";

/// Handles chat commands against an injected store.
pub struct Assistant<S> {
    store: S,
    policy: CommandPolicy,
    weights: &'static [StageWeight],
    today: Option<NaiveDate>,
}

impl<S: CycleStore> Assistant<S> {
    pub fn new(store: S, policy: CommandPolicy) -> Self {
        Self {
            store,
            policy,
            weights: &SONG_STAGES,
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock.
    pub fn at(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> CommandPolicy {
        self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn handle(&self, command: &Command) -> String {
        match command {
            Command::Start => format!("{GREETING}\n\n{HELP}"),
            Command::Help => HELP.to_string(),
            Command::New {
                name,
                days,
                force: false,
            } => self.create(name.as_deref(), days.as_deref()),
            Command::New {
                name,
                days,
                force: true,
            } => self.create_forced(name.as_deref(), days.as_deref()),
            Command::Status => self.status(),
            Command::Done { stage } => self.complete(stage),
            Command::Plan { days } => self.plan(days.as_deref()),
            Command::Unknown(_) => format!("Не знаю такой команды.\n\n{HELP}"),
        }
    }

    /// Start a new cycle unless an unfinished one would be overwritten.
    pub fn create(&self, name: Option<&str>, days: Option<&str>) -> String {
        let today = self.today();
        let existing = self.store.load();
        if requires_confirmation(existing.as_ref(), today) {
            if let Some(current) = existing {
                tracing::info!(name = ?current.project_name, "create refused, cycle in progress");
                let mut hint = String::from("/new_force");
                if let Some(n) = name {
                    hint.push(' ');
                    hint.push_str(n);
                }
                if let Some(d) = days {
                    hint.push(' ');
                    hint.push_str(d);
                }
                return format!(
                    "Сейчас идёт цикл «{}» (день {} из {}). Чтобы заменить его, отправь {hint}",
                    current.display_name(),
                    current.current_day_index(today),
                    current.total_days
                );
            }
        }
        self.create_forced(name, days)
    }

    /// Start a new cycle, replacing whatever is stored.
    pub fn create_forced(&self, name: Option<&str>, days: Option<&str>) -> String {
        let today = self.today();
        let resolved = self.policy.resolve_days(days);
        let cycle = match Cycle::create(
            name.map(str::to_string),
            resolved.days,
            today,
            self.weights,
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "cycle creation failed");
                return format!("Не удалось создать цикл: {e}");
            }
        };

        if let Err(e) = self.store.save(&cycle) {
            tracing::error!(error = %e, "failed to save new cycle");
            return SAVE_FAILED.to_string();
        }
        tracing::info!(name = ?cycle.project_name, days = cycle.total_days, "cycle created");

        let mut reply = String::new();
        if let Some(note) = &resolved.note {
            reply.push_str(&self.policy.describe(note, resolved.days));
            reply.push('\n');
        }
        reply.push_str(&format!(
            "🎵 Новый цикл «{}» на {} дн. начинается {}.\n\n{}",
            cycle.display_name(),
            cycle.total_days,
            cycle.start_date.format("%d.%m.%Y"),
            cycle.render_summary()
        ));
        reply
    }

    pub fn status(&self) -> String {
        let Some(cycle) = self.store.load() else {
            return "Цикл не запущен. Начни с /new <название> [дни].".to_string();
        };
        let today = self.today();
        let day = cycle.current_day_index(today);
        let done = cycle.completed_count();
        let total_stages = cycle.stages.len();

        match cycle.phase(today) {
            CyclePhase::NotStarted => format!(
                "Цикл «{}» начнётся через {} дн. ({}).\n\n{}",
                cycle.display_name(),
                1 - day,
                cycle.start_date.format("%d.%m.%Y"),
                cycle.render_summary()
            ),
            CyclePhase::Elapsed => format!(
                "Цикл «{}» завершён ({} дн.). Этапов выполнено: {done}/{total_stages}.\n\n{}\n\nНачни новый: /new <название> [дни]",
                cycle.display_name(),
                cycle.total_days,
                cycle.render_summary()
            ),
            CyclePhase::Active => {
                let mut reply = format!(
                    "🎵 «{}»\nДень {day} из {} ({}%)\n",
                    cycle.display_name(),
                    cycle.total_days,
                    cycle.overall_percent(today)
                );
                if let Some(p) = cycle.progress_within_stage(day) {
                    reply.push_str(&format!(
                        "Текущий этап: {}, день {} из {} ({}%)\n",
                        p.label, p.days_into_stage, p.day_count, p.percent
                    ));
                }
                reply.push_str(&format!(
                    "Этапов выполнено: {done}/{total_stages}\n\n{}",
                    cycle.render_summary()
                ));
                reply
            }
        }
    }

    pub fn complete(&self, stage: &str) -> String {
        let Some(mut cycle) = self.store.load() else {
            return "Нет активного цикла. Начни с /new <название> [дни].".to_string();
        };
        let stage = stage.trim();
        let stage_list = cycle.stage_labels().join(", ");
        if stage.is_empty() {
            return format!("Укажи этап: /done <этап>\nЭтапы: {stage_list}");
        }

        let Some(label) = cycle
            .stages
            .iter()
            .find(|s| s.matches_label(stage))
            .map(|s| s.label.clone())
        else {
            return format!("Этап «{stage}» не найден. Этапы: {stage_list}");
        };

        cycle.mark_complete(&label);
        if let Err(e) = self.store.save(&cycle) {
            tracing::error!(error = %e, stage = %label, "failed to save completion");
            return SAVE_FAILED.to_string();
        }
        tracing::info!(stage = %label, "stage completed");

        format!(
            "✅ Этап «{label}» отмечен выполненным. Готово {}/{}.",
            cycle.completed_count(),
            cycle.stages.len()
        )
    }

    /// Show how `days` would be split, without touching the store.
    pub fn plan(&self, days: Option<&str>) -> String {
        let resolved = self.policy.resolve_days(days);
        let plan = allocator::schedule(&allocator::allocate(resolved.days, self.weights));
        let mut reply = String::new();
        if let Some(note) = &resolved.note {
            reply.push_str(&self.policy.describe(note, resolved.days));
            reply.push('\n');
        }
        reply.push_str(&format!("План на {} дн.:\n", resolved.days));
        reply.push_str(
            &plan
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        );
        reply
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn assistant() -> Assistant<MemoryStore> {
        Assistant::new(MemoryStore::new(), CommandPolicy::default()).at(today())
    }

    fn assistant_with(cycle: Cycle) -> Assistant<MemoryStore> {
        Assistant::new(MemoryStore::with_cycle(cycle), CommandPolicy::default()).at(today())
    }

    fn started_days_ago(days: u64, total: u32) -> Cycle {
        let start = today().checked_sub_days(Days::new(days)).unwrap();
        Cycle::create(Some("Старая".into()), total, start, &SONG_STAGES).unwrap()
    }

    // -- parsing --------------------------------------------------------------

    #[test]
    fn parse_basic_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("  /status  "), Command::Status);
        assert_eq!(Command::parse("/status@mnemono_bot"), Command::Status);
    }

    #[test]
    fn parse_new_splits_trailing_days() {
        assert_eq!(
            Command::parse("/new Летняя песня 45"),
            Command::New {
                name: Some("Летняя песня".into()),
                days: Some("45".into()),
                force: false,
            }
        );
        assert_eq!(
            Command::parse("/new Летняя песня"),
            Command::New {
                name: Some("Летняя песня".into()),
                days: None,
                force: false,
            }
        );
        assert_eq!(
            Command::parse("/new 14"),
            Command::New {
                name: None,
                days: Some("14".into()),
                force: false,
            }
        );
        assert_eq!(
            Command::parse("/new"),
            Command::New {
                name: None,
                days: None,
                force: false,
            }
        );
    }

    #[test]
    fn parse_new_force() {
        assert_eq!(
            Command::parse("/new_force Зима 60"),
            Command::New {
                name: Some("Зима".into()),
                days: Some("60".into()),
                force: true,
            }
        );
    }

    #[test]
    fn parse_done_keeps_multiword_stage() {
        assert_eq!(
            Command::parse("/done Сведение и мастеринг"),
            Command::Done {
                stage: "Сведение и мастеринг".into()
            }
        );
        assert_eq!(
            Command::parse("/complete демо"),
            Command::Done {
                stage: "демо".into()
            }
        );
    }

    #[test]
    fn parse_unknown_and_plain_text() {
        assert!(matches!(Command::parse("/dance"), Command::Unknown(_)));
        assert!(matches!(Command::parse("привет"), Command::Unknown(_)));
    }

    // -- day policy -------------------------------------------------------------

    #[test]
    fn resolve_days_policy() {
        let policy = CommandPolicy::default();
        assert_eq!(policy.resolve_days(None).days, 30);
        assert_eq!(policy.resolve_days(Some("45")).days, 45);

        let low = policy.resolve_days(Some("3"));
        assert_eq!(low.days, 7);
        assert_eq!(low.note, Some(DayNote::RaisedToMinimum(3)));

        let negative = policy.resolve_days(Some("-5"));
        assert_eq!(negative.days, 7);

        let junk = policy.resolve_days(Some("месяц"));
        assert_eq!(junk.days, 30);
        assert_eq!(junk.note, Some(DayNote::Unparsed("месяц".into())));

        let huge = policy.resolve_days(Some("99999999999"));
        assert_eq!(huge.days, 3650);
        assert_eq!(huge.note, Some(DayNote::LoweredToMaximum(99_999_999_999)));

        let overflow = policy.resolve_days(Some("99999999999999999999"));
        assert_eq!(overflow.days, 30);
        assert!(matches!(overflow.note, Some(DayNote::Unparsed(_))));
    }

    #[test]
    fn day_counts_at_the_u32_limit_are_clamped() {
        let a = assistant();
        let reply = a.handle(&Command::parse("/plan 4294967295"));
        assert!(reply.contains("максимум 3650"), "{reply}");
        assert!(reply.contains("План на 3650 дн."));

        let reply = a.handle(&Command::parse("/new Долгая 4294967295"));
        assert!(reply.contains("максимум 3650"), "{reply}");
        assert_eq!(a.store().load().unwrap().total_days, 3650);
    }

    #[test]
    fn policy_from_config() {
        let config = Config {
            default_days: 40,
            min_days: 10,
            max_days: 60,
            ..Config::default()
        };
        let policy = CommandPolicy::from(&config);
        assert_eq!(policy.resolve_days(None).days, 40);
        assert_eq!(policy.resolve_days(Some("8")).days, 10);
        assert_eq!(policy.resolve_days(Some("90")).days, 60);

        let inverted = CommandPolicy::from(&Config {
            min_days: 20,
            max_days: 5,
            ..Config::default()
        });
        assert_eq!(inverted.max_days, 20);
        assert_eq!(inverted.resolve_days(None).days, 20);
    }

    // -- create -----------------------------------------------------------------

    #[test]
    fn create_on_empty_store_saves_cycle() {
        let a = assistant();
        let reply = a.create(Some("Лето"), Some("30"));
        assert!(reply.contains("Лето"));
        assert!(reply.contains("Аранжировка — дни 13–20"));

        let saved = a.store().load().unwrap();
        assert_eq!(saved.total_days, 30);
        assert_eq!(saved.start_date, today());
    }

    #[test]
    fn create_defaults_to_thirty_days() {
        let a = assistant();
        a.create(None, None);
        let saved = a.store().load().unwrap();
        assert_eq!(saved.total_days, 30);
        assert!(saved.project_name.is_none());
    }

    #[test]
    fn create_reports_clamped_days() {
        let a = assistant();
        let reply = a.create(Some("Коротко"), Some("3"));
        assert!(reply.contains("минимум 7"));
        assert_eq!(a.store().load().unwrap().total_days, 7);
    }

    #[test]
    fn create_refuses_while_cycle_active() {
        let a = assistant_with(started_days_ago(4, 30));
        let reply = a.create(Some("Новая"), Some("20"));
        assert!(reply.contains("/new_force Новая 20"));
        assert!(reply.contains("день 5 из 30"));
        assert_eq!(
            a.store().load().unwrap().project_name.as_deref(),
            Some("Старая")
        );
    }

    #[test]
    fn create_overwrites_elapsed_cycle() {
        let a = assistant_with(started_days_ago(40, 30));
        a.create(Some("Новая"), None);
        assert_eq!(
            a.store().load().unwrap().project_name.as_deref(),
            Some("Новая")
        );
    }

    #[test]
    fn create_forced_overwrites_active_cycle() {
        let a = assistant_with(started_days_ago(4, 30));
        let reply = a.handle(&Command::parse("/new_force Новая 14"));
        assert!(reply.contains("Новая"));
        let saved = a.store().load().unwrap();
        assert_eq!(saved.project_name.as_deref(), Some("Новая"));
        assert_eq!(saved.total_days, 14);
    }

    // -- status -----------------------------------------------------------------

    #[test]
    fn status_without_cycle() {
        assert!(assistant().status().contains("Цикл не запущен"));
    }

    #[test]
    fn status_active_reports_day_and_stage() {
        // Start 13 days ago: today is day 14, 2nd of 8 arrangement days.
        let a = assistant_with(started_days_ago(13, 30));
        let reply = a.status();
        assert!(reply.contains("День 14 из 30 (46%)"), "{reply}");
        assert!(reply.contains("Текущий этап: Аранжировка, день 2 из 8 (25%)"), "{reply}");
        assert!(reply.contains("Этапов выполнено: 0/5"));
    }

    #[test]
    fn status_not_started() {
        let start = today().checked_add_days(Days::new(3)).unwrap();
        let cycle = Cycle::create(None, 30, start, &SONG_STAGES).unwrap();
        let reply = assistant_with(cycle).status();
        assert!(reply.contains("начнётся через 3 дн."), "{reply}");
    }

    #[test]
    fn status_elapsed() {
        let reply = assistant_with(started_days_ago(45, 30)).status();
        assert!(reply.contains("завершён"));
        assert!(reply.contains("/new"));
    }

    // -- complete ---------------------------------------------------------------

    #[test]
    fn complete_marks_stage_and_persists() {
        let a = assistant_with(started_days_ago(2, 30));
        let reply = a.complete("сочинение");
        assert!(reply.contains("«Сочинение» отмечен"), "{reply}");
        assert!(a.store().load().unwrap().stages[0].completed);

        // Idempotent.
        let again = a.complete("СОЧИНЕНИЕ");
        assert!(again.contains("Готово 1/5"));
    }

    #[test]
    fn complete_unknown_stage_lists_options() {
        let a = assistant_with(started_days_ago(2, 30));
        let reply = a.complete("мастеринг");
        assert!(reply.contains("не найден"));
        assert!(reply.contains("Сведение и мастеринг"));
        assert_eq!(a.store().load().unwrap().completed_count(), 0);
    }

    #[test]
    fn complete_without_argument_or_cycle() {
        let a = assistant_with(started_days_ago(2, 30));
        assert!(a.complete("  ").contains("Укажи этап"));
        assert!(assistant().complete("Демо").contains("Нет активного цикла"));
    }

    // -- plan / misc ------------------------------------------------------------

    #[test]
    fn plan_does_not_save() {
        let a = assistant();
        let reply = a.plan(Some("30"));
        assert!(reply.starts_with("План на 30 дн."));
        assert!(reply.contains("Сочинение — дни 1–9 (9 дн.)"));
        assert!(a.store().load().is_none());
    }

    #[test]
    fn start_and_unknown_replies() {
        let a = assistant();
        assert!(a.handle(&Command::Start).starts_with(GREETING));
        assert!(a
            .handle(&Command::parse("что дальше?"))
            .contains("Не знаю такой команды"));
    }
}
