// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Field selection expressions, e.g. `0,2~4,3C444`.

use std::str::FromStr;

use super::FieldSelectionError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldTerm {
    Id(usize),
    /// Inclusive.
    Range(usize, usize),
    Name(String),
}

/// A set of comma-separated terms; a field is selected if any term matches.
/// A term is a field index (`3`), an inclusive range of indices (`2~5`) or a
/// field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    terms: Vec<FieldTerm>,
}

impl FieldSelection {
    /// Does this selection include the field with index `id` and name `name`?
    pub fn matches(&self, id: usize, name: Option<&str>) -> bool {
        self.terms.iter().any(|term| match term {
            FieldTerm::Id(i) => *i == id,
            FieldTerm::Range(start, end) => (*start..=*end).contains(&id),
            FieldTerm::Name(n) => name == Some(n.as_str()),
        })
    }
}

impl FromStr for FieldSelection {
    type Err = FieldSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(FieldSelectionError::Empty);
        }

        let terms = s
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(i, term)| {
                if term.is_empty() {
                    return Err(FieldSelectionError::EmptyTerm(i));
                }
                if let Some((start, end)) = term.split_once('~') {
                    let bad_range = || FieldSelectionError::BadRange(term.to_string());
                    let start: usize = start.trim().parse().map_err(|_| bad_range())?;
                    let end: usize = end.trim().parse().map_err(|_| bad_range())?;
                    if start > end {
                        return Err(bad_range());
                    }
                    return Ok(FieldTerm::Range(start, end));
                }
                match term.parse() {
                    Ok(id) => Ok(FieldTerm::Id(id)),
                    Err(_) => Ok(FieldTerm::Name(term.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldSelection { terms })
    }
}
