//! Resolving table results into final text.
//!
//! Resolution fetches a result's text and walks its links left to right.
//! Bare rolls are replaced by their value. Table references are replaced by
//! a short summary (`[2 on Goblins]`) and each roll on the referenced table
//! is resolved recursively and attached as a child line.
//!
//! Problems with individual links (unknown tables, unrecognized link text,
//! the recursion bound, oversized roll counts) do not abort resolution: the link is left as
//! written and the error is collected in [`Resolution::issues`].

use std::fmt::{self, Write as _};

use tracing::{debug, warn};

use tr_dice::{DiceSource, RollOutcome, evaluate};

use crate::config::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT, MAX_REFERENCE_ROLLS, ResolverConfig};
use crate::error::{TableError, TableResult};
use crate::link::{LinkKind, LinkToken};
use crate::store::TableStore;
use crate::table::Table;

/// One resolved result: its expanded text plus sub-results from table
/// references, in link order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    /// The result text with every link substituted.
    pub text: String,
    /// Results rolled on referenced tables.
    pub children: Vec<ResolvedText>,
}

impl ResolvedText {
    fn render(&self, depth: usize, out: &mut String) {
        if depth > 0 {
            out.push('\n');
            out.push_str(&"\t".repeat(depth));
        }
        out.push_str(&self.text);
        for child in &self.children {
            child.render(depth + 1, out);
        }
    }

    /// Total number of results in this tree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ResolvedText::count).sum::<usize>()
    }
}

impl fmt::Display for ResolvedText {
    /// Renders the text, then each child on its own line indented by one
    /// tab per nesting level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(0, &mut out);
        f.write_str(&out)
    }
}

/// The output of a resolution: the text tree and any recoverable issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved text tree.
    pub resolved: ResolvedText,
    /// Recoverable problems hit along the way, in the order they occurred.
    pub issues: Vec<TableError>,
}

impl Resolution {
    /// True if every link resolved cleanly.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved)
    }
}

/// A roll on a table together with the resolved result.
#[derive(Debug, Clone)]
pub struct RolledEntry {
    /// Name of the table rolled on.
    pub table: String,
    /// The table roll that picked the result.
    pub outcome: RollOutcome,
    /// The resolved result.
    pub resolution: Resolution,
}

impl RolledEntry {
    /// The result key that was rolled.
    pub fn key(&self) -> i64 {
        self.outcome.final_value()
    }
}

/// Resolves results against a store of tables.
///
/// Holds a shared reference to the store for its whole lifetime; tables
/// cannot change underneath a resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    store: &'s TableStore,
    max_depth: u32,
}

impl<'s> Resolver<'s> {
    /// Create a resolver with the default recursion bound.
    pub fn new(store: &'s TableStore) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a resolver using the recursion bound from `config`.
    pub fn with_config(store: &'s TableStore, config: &ResolverConfig) -> Self {
        Self::new(store).with_max_depth(config.max_depth)
    }

    /// Set the recursion bound, clamped to [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// The store this resolver reads from.
    pub fn store(&self) -> &'s TableStore {
        self.store
    }

    /// Resolve the result at `key` of `table`.
    ///
    /// Fails with [`TableError::UnknownResultKey`] if `table` has no such
    /// result. Everything else is collected as an issue.
    pub fn resolve<S: DiceSource + ?Sized>(
        &self,
        table: &Table,
        key: i64,
        source: &mut S,
    ) -> TableResult<Resolution> {
        let mut issues = Vec::new();
        let resolved = self.expand(table, key, self.max_depth, source, &mut issues)?;
        Ok(Resolution { resolved, issues })
    }

    /// Roll on `table` with its own roll and resolve the result.
    pub fn roll<S: DiceSource + ?Sized>(&self, table: &Table, source: &mut S) -> TableResult<RolledEntry> {
        let spec = table.effective_roll()?;
        let outcome = evaluate(&spec, source)?;
        debug!(table = table.name(), roll = %outcome, "rolled on table");
        let resolution = self.resolve(table, outcome.final_value(), source)?;
        Ok(RolledEntry {
            table: table.name().to_string(),
            outcome,
            resolution,
        })
    }

    fn expand<S: DiceSource + ?Sized>(
        &self,
        table: &Table,
        key: i64,
        depth_left: u32,
        source: &mut S,
        issues: &mut Vec<TableError>,
    ) -> TableResult<ResolvedText> {
        let entry = table.get_result(key)?;
        debug!(table = table.name(), key, depth_left, "expanding result");

        let raw = entry.raw();
        let mut text = String::with_capacity(raw.len());
        let mut children = Vec::new();
        let mut cursor = 0;

        for link in entry.embedded() {
            text.push_str(&raw[cursor..link.span.start]);
            cursor = link.span.end;
            let written = &raw[link.span.clone()];

            let token = match &link.parsed {
                Ok(token) => token,
                Err(e) => {
                    record(issues, e.clone());
                    text.push_str(written);
                    continue;
                }
            };

            match token.kind() {
                LinkKind::BareRoll => match token.amount().roll(source) {
                    Ok(value) => {
                        let _ = write!(text, "[{value}]");
                    }
                    Err(e) => {
                        record(issues, e.into());
                        text.push_str(written);
                    }
                },
                LinkKind::TableReference { table: name } => {
                    match self.expand_reference(token, name, depth_left, source, issues) {
                        Some((summary, rolled)) => {
                            text.push_str(&summary);
                            children.extend(rolled);
                        }
                        None => text.push_str(written),
                    }
                }
            }
        }
        text.push_str(&raw[cursor..]);

        Ok(ResolvedText { text, children })
    }

    fn expand_reference<S: DiceSource + ?Sized>(
        &self,
        token: &LinkToken,
        name: &str,
        depth_left: u32,
        source: &mut S,
        issues: &mut Vec<TableError>,
    ) -> Option<(String, Vec<ResolvedText>)> {
        let Some(target) = self.store.get(name) else {
            record(
                issues,
                TableError::UnknownTableReference {
                    table: name.to_string(),
                    link: token.source_text().to_string(),
                },
            );
            return None;
        };

        if depth_left == 0 {
            record(
                issues,
                TableError::RecursionLimitExceeded {
                    table: target.name().to_string(),
                    max_depth: self.max_depth,
                },
            );
            return None;
        }

        let count = match token.amount().roll(source) {
            Ok(n) => n.max(0),
            Err(e) => {
                record(issues, e.into());
                return None;
            }
        };
        if count > i64::from(MAX_REFERENCE_ROLLS) {
            record(
                issues,
                TableError::TooManyReferenceRolls {
                    table: target.name().to_string(),
                    link: token.source_text().to_string(),
                    count,
                    max: MAX_REFERENCE_ROLLS,
                },
            );
            return None;
        }
        let spec = match target.effective_roll() {
            Ok(spec) => spec,
            Err(e) => {
                record(issues, e);
                return None;
            }
        };

        let mut rolled = Vec::new();
        for _ in 0..count {
            let key = match evaluate(&spec, source) {
                Ok(outcome) => outcome.final_value(),
                Err(e) => {
                    record(issues, e.into());
                    continue;
                }
            };
            match self.expand(target, key, depth_left - 1, source, issues) {
                Ok(child) => rolled.push(child),
                Err(e) => record(issues, e),
            }
        }

        Some((format!("[{count} on {}]", target.name()), rolled))
    }
}

fn record(issues: &mut Vec<TableError>, error: TableError) {
    warn!(%error, "link left unexpanded");
    issues.push(error);
}

/// Resolve the result at `key` of `table` against `store`.
///
/// Shorthand for [`Resolver::resolve`] with an explicit recursion bound.
pub fn resolve<S: DiceSource + ?Sized>(
    table: &Table,
    key: i64,
    source: &mut S,
    store: &TableStore,
    max_depth: u32,
) -> TableResult<Resolution> {
    Resolver::new(store)
        .with_max_depth(max_depth)
        .resolve(table, key, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tr_dice::FixedRolls;

    fn loot() -> Table {
        Table::new("Loot", "length", [(1, "A sword"), (2, "A shield")]).unwrap()
    }

    fn store_with(tables: Vec<Table>) -> TableStore {
        tables.into_iter().collect()
    }

    #[test]
    fn plain_result_resolves_to_itself() {
        let store = store_with(vec![loot()]);
        let table = store.get("Loot").unwrap();
        let res = Resolver::new(&store)
            .resolve(table, 2, &mut FixedRolls::new(vec![]))
            .unwrap();
        assert_eq!(res.to_string(), "A shield");
        assert!(res.is_clean());
        assert!(res.resolved.children.is_empty());
    }

    #[test]
    fn table_reference_expands_child_line() {
        let room = Table::new("Room", "length", [(1, "You find [1@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let table = store.get("Room").unwrap();
        let res = Resolver::new(&store)
            .resolve(table, 1, &mut FixedRolls::new(vec![1]))
            .unwrap();

        let rendered = res.to_string();
        assert!(rendered.contains("1 on Loot"), "{rendered}");
        assert!(rendered.lines().any(|l| l.trim() == "A sword"), "{rendered}");
        assert_eq!(rendered, "You find [1 on Loot]\n\tA sword");
        assert!(res.is_clean());
    }

    #[test]
    fn bare_rolls_are_substituted_in_place() {
        let table = Table::new("Coins", "length", [(1, "[2d6] gold and [3] silver")]).unwrap();
        let store = store_with(vec![table]);
        let res = Resolver::new(&store)
            .resolve(store.get("Coins").unwrap(), 1, &mut FixedRolls::new(vec![2, 5]))
            .unwrap();
        assert_eq!(res.to_string(), "[7] gold and [3] silver");
    }

    #[test]
    fn duplicate_links_roll_independently() {
        let table = Table::new("Twice", "length", [(1, "[1d6] then [1d6]")]).unwrap();
        let store = store_with(vec![table]);
        let res = Resolver::new(&store)
            .resolve(store.get("Twice").unwrap(), 1, &mut FixedRolls::new(vec![2, 5]))
            .unwrap();
        assert_eq!(res.to_string(), "[2] then [5]");
    }

    #[test]
    fn substituted_value_is_never_rematched() {
        let table = Table::new("Sneaky", "length", [(1, "[1d1] and [1]")]).unwrap();
        let store = store_with(vec![table]);
        let res = Resolver::new(&store)
            .resolve(store.get("Sneaky").unwrap(), 1, &mut FixedRolls::new(vec![1]))
            .unwrap();
        assert_eq!(res.to_string(), "[1] and [1]");
    }

    #[test]
    fn rolled_count_rolls_that_many_times() {
        let room = Table::new("Room", "length", [(1, "Chests: [1d3@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        // count 3, then Loot rolls 2, 1, 2
        let mut src = FixedRolls::new(vec![3, 2, 1, 2]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut src)
            .unwrap();
        assert_eq!(res.resolved.text, "Chests: [3 on Loot]");
        let kids: Vec<_> = res.resolved.children.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(kids, vec!["A shield", "A sword", "A shield"]);
        assert_eq!(res.resolved.count(), 4);
    }

    #[test]
    fn zero_count_expands_nothing() {
        let room = Table::new("Room", "length", [(1, "Nothing: [0@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![1]))
            .unwrap();
        assert_eq!(res.to_string(), "Nothing: [0 on Loot]");
    }

    #[test]
    fn negative_count_is_treated_as_zero() {
        let room = Table::new("Room", "length", [(1, "[1d2-5@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![1]))
            .unwrap();
        assert_eq!(res.to_string(), "[0 on Loot]");
    }

    #[test]
    fn oversized_reference_count_is_recorded() {
        let room = Table::new(
            "Room",
            "length",
            [(1, "[5000@Loot] and [1d6*4294967295@Loot]")],
        )
        .unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![6]))
            .unwrap();

        assert_eq!(res.to_string(), "[5000@Loot] and [1d6*4294967295@Loot]");
        assert!(res.resolved.children.is_empty());
        assert_eq!(
            res.issues,
            vec![
                TableError::TooManyReferenceRolls {
                    table: "Loot".into(),
                    link: "5000@Loot".into(),
                    count: 5000,
                    max: MAX_REFERENCE_ROLLS
                },
                TableError::TooManyReferenceRolls {
                    table: "Loot".into(),
                    link: "1d6*4294967295@Loot".into(),
                    count: 25_769_803_770,
                    max: MAX_REFERENCE_ROLLS
                },
            ]
        );
    }

    #[test]
    fn reference_count_at_the_cap_expands() {
        let room = Table::new("Room", "length", [(1, "[1000@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![1]))
            .unwrap();
        assert_eq!(res.resolved.text, "[1000 on Loot]");
        assert_eq!(res.resolved.children.len(), 1000);
        assert!(res.is_clean());
    }

    #[test]
    fn unknown_key_is_fatal() {
        let store = store_with(vec![loot()]);
        let err = Resolver::new(&store)
            .resolve(store.get("Loot").unwrap(), 3, &mut FixedRolls::new(vec![]))
            .unwrap_err();
        assert_eq!(
            err,
            TableError::UnknownResultKey {
                table: "Loot".into(),
                key: 3
            }
        );
    }

    #[test]
    fn unknown_table_is_recorded_and_others_continue() {
        let room = Table::new(
            "Room",
            "length",
            [(1, "[1@Goblins] guard [1@Loot] worth [1d4] gold")],
        )
        .unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![2, 3]))
            .unwrap();
        assert_eq!(res.resolved.text, "[1@Goblins] guard [1 on Loot] worth [3] gold");
        assert_eq!(res.resolved.children[0].text, "A shield");
        assert_eq!(
            res.issues,
            vec![TableError::UnknownTableReference {
                table: "Goblins".into(),
                link: "1@Goblins".into()
            }]
        );
    }

    #[test]
    fn unrecognized_links_stay_as_written() {
        let table = Table::new("Odd", "length", [(1, "roll [1f4] and [1d4]")]).unwrap();
        let store = store_with(vec![table]);
        let res = Resolver::new(&store)
            .resolve(store.get("Odd").unwrap(), 1, &mut FixedRolls::new(vec![4]))
            .unwrap();
        assert_eq!(res.to_string(), "roll [1f4] and [4]");
        assert_eq!(
            res.issues,
            vec![TableError::UnrecognizedLinkFormat("1f4".into())]
        );
    }

    #[test]
    fn self_reference_stops_at_depth_bound() {
        let table = Table::new("SelfTable", "length", [(1, "[1@SelfTable]")]).unwrap();
        let store = store_with(vec![table]);
        let res = resolve(
            store.get("SelfTable").unwrap(),
            1,
            &mut FixedRolls::new(vec![1]),
            &store,
            3,
        )
        .unwrap();

        assert_eq!(
            res.issues,
            vec![TableError::RecursionLimitExceeded {
                table: "SelfTable".into(),
                max_depth: 3
            }]
        );
        // three levels expanded below the top
        assert_eq!(res.resolved.count(), 4);
        assert_eq!(
            res.to_string(),
            "[1 on SelfTable]\n\t[1 on SelfTable]\n\t\t[1 on SelfTable]\n\t\t\t[1@SelfTable]"
        );
    }

    #[test]
    fn huge_depth_is_clamped_and_terminates() {
        let table = Table::new("SelfTable", "length", [(1, "[1@SelfTable]")]).unwrap();
        let store = store_with(vec![table]);
        let res = resolve(
            store.get("SelfTable").unwrap(),
            1,
            &mut FixedRolls::new(vec![1]),
            &store,
            1_000_000,
        )
        .unwrap();

        assert_eq!(
            res.issues,
            vec![TableError::RecursionLimitExceeded {
                table: "SelfTable".into(),
                max_depth: MAX_DEPTH_LIMIT
            }]
        );
        assert_eq!(res.resolved.count(), MAX_DEPTH_LIMIT as usize + 1);
    }

    #[test]
    fn mutual_references_terminate() {
        let ping = Table::new("Ping", "length", [(1, "ping [1@Pong]")]).unwrap();
        let pong = Table::new("Pong", "length", [(1, "pong [2@Ping]")]).unwrap();
        let store = store_with(vec![ping, pong]);
        let mut rng = StdRng::seed_from_u64(3);
        let res = Resolver::new(&store)
            .with_max_depth(4)
            .resolve(store.get("Ping").unwrap(), 1, &mut rng)
            .unwrap();
        assert!(!res.issues.is_empty());
        assert!(
            res.issues
                .iter()
                .all(|e| matches!(e, TableError::RecursionLimitExceeded { .. }))
        );
    }

    #[test]
    fn zero_depth_expands_no_references() {
        let room = Table::new("Room", "length", [(1, "You find [1@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let res = Resolver::new(&store)
            .with_max_depth(0)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![1]))
            .unwrap();
        assert_eq!(res.to_string(), "You find [1@Loot]");
        assert_eq!(res.issues.len(), 1);
    }

    #[test]
    fn child_with_missing_key_is_recorded() {
        let sparse = Table::new("Sparse", "1d4", [(1, "one")]).unwrap();
        let room = Table::new("Room", "length", [(1, "[1@Sparse]")]).unwrap();
        let store = store_with(vec![sparse, room]);
        let res = Resolver::new(&store)
            .resolve(store.get("Room").unwrap(), 1, &mut FixedRolls::new(vec![3]))
            .unwrap();
        assert_eq!(res.to_string(), "[1 on Sparse]");
        assert_eq!(
            res.issues,
            vec![TableError::UnknownResultKey {
                table: "Sparse".into(),
                key: 3
            }]
        );
    }

    #[test]
    fn roll_uses_the_tables_own_roll() {
        let store = store_with(vec![loot()]);
        let entry = Resolver::new(&store)
            .roll(store.get("Loot").unwrap(), &mut FixedRolls::new(vec![2]))
            .unwrap();
        assert_eq!(entry.key(), 2);
        assert_eq!(entry.table, "Loot");
        assert_eq!(entry.outcome.spec().to_string(), "1d2");
        assert_eq!(entry.resolution.to_string(), "A shield");
    }

    #[test]
    fn roll_surfaces_missing_top_level_key() {
        let sparse = Table::new("Sparse", "1d6+10", [(1, "one")]).unwrap();
        let store = store_with(vec![sparse]);
        let err = Resolver::new(&store)
            .roll(store.get("Sparse").unwrap(), &mut FixedRolls::new(vec![1]))
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownResultKey { key: 11, .. }));
    }

    #[test]
    fn config_sets_depth() {
        let store = TableStore::new();
        let cfg = ResolverConfig::default().with_max_depth(2);
        let resolver = Resolver::with_config(&store, &cfg);
        assert_eq!(resolver.max_depth, 2);
        assert!(resolver.store().is_empty());

        let cfg = ResolverConfig {
            max_depth: u32::MAX,
            seed: None,
        };
        assert_eq!(Resolver::with_config(&store, &cfg).max_depth, MAX_DEPTH_LIMIT);
    }

    #[test]
    fn seeded_resolution_is_reproducible() {
        let room = Table::new("Room", "length", [(1, "[2d6] coins, [1d4@Loot]")]).unwrap();
        let store = store_with(vec![loot(), room]);
        let resolver = Resolver::new(&store);
        let table = store.get("Room").unwrap();
        let a = resolver.resolve(table, 1, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = resolver.resolve(table, 1, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn large_modifiers_use_wide_arithmetic() {
        let table = Table::new("Huge", "length", [(1, "[1d6*4294967295]")]).unwrap();
        let store = store_with(vec![table]);
        let res = Resolver::new(&store)
            .resolve(store.get("Huge").unwrap(), 1, &mut FixedRolls::new(vec![6]))
            .unwrap();
        assert_eq!(res.to_string(), "[25769803770]");
        assert!(res.is_clean());
    }
}
