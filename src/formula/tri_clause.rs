use std::fmt::Display;

use crate::formula::{Literal, Variable};
use crate::prelude::*;

/// Internal consistency failures of clause construction and mutation.
/// These indicate a logic defect, never bad input.
#[derive(Debug, Snafu)]
pub enum ClauseError {
    #[snafu(display(
        "Sentinel literal followed by a literal in clause {:?}",
        literals
    ))]
    SentinelOrder { literals: [i32; 3] },
    #[snafu(display("Literal {} has no negation", raw))]
    InvalidLiteral { raw: i32 },
    #[snafu(display(
        "A clause of {} literals does not fit into {} slots",
        len,
        TriClause::CAPACITY
    ))]
    TooWide { len: usize },
    #[snafu(display(
        "Literal index {} is out of range for a clause of {} literals",
        index,
        len
    ))]
    IndexOutOfRange { index: usize, len: usize },
}

/// Disjunction of at most three literals, stored inline.
///
/// Unused slots hold the sentinel `0` and always form a suffix, so two
/// clauses holding the same literals in the same slot order compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriClause {
    slots: [i32; 3],
    len: u8,
}

impl TriClause {
    pub const CAPACITY: usize = 3;

    /// Builds a clause from raw signed literals, `0` marking an unused slot.
    pub fn new(lit1: i32, lit2: i32, lit3: i32) -> Result<Self, ClauseError> {
        let slots = [lit1, lit2, lit3];

        let mut len = 0;
        for (index, &raw) in slots.iter().enumerate() {
            ensure!(raw != std::i32::MIN, InvalidLiteral { raw });
            if raw != 0 {
                ensure!(len == index, SentinelOrder { literals: slots });
                len += 1;
            }
        }

        Ok(TriClause {
            slots,
            len: len as u8,
        })
    }

    pub fn from_literals(literals: &[Literal]) -> Result<Self, ClauseError> {
        ensure!(
            literals.len() <= Self::CAPACITY,
            TooWide {
                len: literals.len()
            }
        );

        let mut slots = [0; 3];
        for (slot, literal) in slots.iter_mut().zip(literals) {
            *slot = literal.raw();
        }
        TriClause::new(slots[0], slots[1], slots[2])
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_unit(&self) -> bool {
        self.len == 1
    }

    pub fn first(&self) -> Option<Literal> {
        Literal::from_raw(self.slots[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.slots[..self.len()]
            .iter()
            .filter_map(|&raw| Literal::from_raw(raw))
    }

    pub fn position(&self, literal: Literal) -> Option<usize> {
        self.slots[..self.len()]
            .iter()
            .position(|&raw| raw == literal.raw())
    }

    pub fn contains_literal(&self, literal: Literal) -> bool {
        self.position(literal).is_some()
    }

    /// True if either polarity of `variable` occurs.
    pub fn contains_variable(&self, variable: Variable) -> bool {
        let id = variable.get() as i32;
        self.slots[..self.len()]
            .iter()
            .any(|&raw| raw == id || raw == -id)
    }

    /// Removes the literal at `index`, shifting later literals left.
    pub fn remove_at(&mut self, index: usize) -> Result<Literal, ClauseError> {
        let len = self.len();
        ensure!(index < len, IndexOutOfRange { index, len });

        let removed = self.slots[index];
        self.slots.copy_within(index + 1..len, index);
        self.slots[len - 1] = 0;
        self.len -= 1;

        Literal::from_raw(removed).context(InvalidLiteral { raw: removed })
    }

    /// Removes the first occurrence of `literal`. Returns whether it was present.
    pub fn remove_literal(&mut self, literal: Literal) -> bool {
        match self.position(literal) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Cheap hash over the slot values. Equal clauses share a fingerprint,
    /// but a shared fingerprint must be confirmed with `==`.
    pub fn fingerprint(&self) -> u32 {
        let [a, b, c] = self.slots;
        (a as u32) ^ (b as u32).rotate_left(4) ^ (c as u32).rotate_left(8)
    }
}

impl Display for TriClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        super::write_disjunction(f, self.iter())
    }
}
