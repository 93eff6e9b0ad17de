//! Grammar validation and compilation.
//!
//! [`Grammar::new`] flattens a [`ParseRule`] tree into a preorder table of
//! compiled rules addressed by `u32` ids (the root is id 0) and resolves every
//! [`RuleKind::Ref`] to the id of the rule it names. The first non-reference
//! rule declared under a name is the one references reach.
//!
//! The root is special: its children are the top-level alternatives, tried in
//! declaration order at every top-level position. The root's own kind and
//! action are not consulted; it always becomes the root node of the tree.

use pi_ast::AstAct;
use rustc_hash::FxHashMap;

use crate::errors::ParseError;
use crate::rule::{ParseRule, RuleKind, TokenMatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Compiled {
    Seq,
    Alt,
    Opt,
    Repeat(usize),
    Token(TokenMatch),
    Ref(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) name: String,
    pub(crate) off: bool,
    pub(crate) kind: Compiled,
    pub(crate) act: AstAct,
    pub(crate) reverse: bool,
    pub(crate) exclude: bool,
    pub(crate) children: Vec<u32>,
}

impl CompiledRule {
    pub(crate) fn is_lookaround(&self) -> bool {
        self.reverse || self.exclude
    }
}

/// A validated grammar. Immutable once built and safe to share between
/// threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    source: ParseRule,
    pub(crate) rules: Vec<CompiledRule>,
    by_name: FxHashMap<String, u32>,
}

impl Grammar {
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedGrammar`] when a reference names no
    /// rule, a token or reference rule has children, or a reverse rule is not
    /// a plain token sequence.
    pub fn new(root: ParseRule) -> Result<Self, ParseError> {
        let mut flat: Vec<&ParseRule> = Vec::new();
        root.walk(&mut |r| flat.push(r));

        let mut by_name = FxHashMap::default();
        for (id, rule) in flat.iter().enumerate() {
            if matches!(rule.kind, RuleKind::Ref(_)) || rule.name.is_empty() {
                continue;
            }
            by_name
                .entry(rule.name.clone())
                .or_insert(u32::try_from(id).unwrap_or(u32::MAX));
        }

        let mut problems = Vec::new();
        let mut rules = Vec::with_capacity(flat.len());
        for (id, rule) in flat.iter().enumerate() {
            let mut next = u32::try_from(id + 1).unwrap_or(u32::MAX);
            let children: Vec<u32> = rule
                .children
                .iter()
                .map(|c| {
                    let child = next;
                    next += subtree_size(c);
                    child
                })
                .collect();
            let kind = match &rule.kind {
                RuleKind::Seq => Compiled::Seq,
                RuleKind::Alt => Compiled::Alt,
                RuleKind::Opt => Compiled::Opt,
                RuleKind::Repeat { min } => Compiled::Repeat(*min),
                RuleKind::Token(m) => Compiled::Token(m.clone()),
                RuleKind::Ref(target) => match by_name.get(target) {
                    Some(id) => Compiled::Ref(*id),
                    None => {
                        problems.push(format!(
                            "rule `{}` refers to undefined rule `{target}`",
                            rule.name
                        ));
                        Compiled::Ref(0)
                    }
                },
            };
            if matches!(kind, Compiled::Token(_) | Compiled::Ref(_)) && !rule.children.is_empty() {
                problems.push(format!("leaf rule `{}` has children", rule.name));
            }
            if rule.reverse && !is_token_sequence(rule) {
                problems.push(format!(
                    "reverse rule `{}` must be a token or a sequence of tokens",
                    rule.name
                ));
            }
            rules.push(CompiledRule {
                name: rule.name.clone(),
                off: rule.off,
                kind,
                act: rule.act,
                reverse: rule.reverse,
                exclude: rule.exclude,
                children,
            });
        }
        if !problems.is_empty() {
            return Err(ParseError::MalformedGrammar(problems.join("; ")));
        }
        Ok(Self {
            source: root,
            rules,
            by_name,
        })
    }

    /// # Errors
    ///
    /// Returns an error when the JSON is invalid or the tree is malformed.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let root: ParseRule =
            serde_json::from_str(json).map_err(|e| ParseError::Json(e.to_string()))?;
        Self::new(root)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(&self.source).map_err(|e| ParseError::Json(e.to_string()))
    }

    #[must_use]
    pub fn root(&self) -> &ParseRule {
        &self.source
    }

    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.source.name
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Id of the rule references named `name` resolve to.
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn rule_name(&self, id: u32) -> Option<&str> {
        self.rules.get(id as usize).map(|r| r.name.as_str())
    }

    /// Ids of every rule with the `off` flag set.
    #[must_use]
    pub fn off_rules(&self) -> Vec<u32> {
        (0..self.rules.len())
            .filter(|i| self.rules[*i].off)
            .filter_map(|i| u32::try_from(i).ok())
            .collect()
    }

    pub(crate) fn rule(&self, id: u32) -> &CompiledRule {
        &self.rules[id as usize]
    }
}

fn subtree_size(rule: &ParseRule) -> u32 {
    1 + rule.children.iter().map(subtree_size).sum::<u32>()
}

fn is_token_sequence(rule: &ParseRule) -> bool {
    match rule.kind {
        RuleKind::Token(_) => true,
        RuleKind::Seq => rule
            .children
            .iter()
            .all(|c| matches!(c.kind, RuleKind::Token(_))),
        _ => false,
    }
}
