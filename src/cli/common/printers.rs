// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.
//!
//! Information is drawn as a small tree underneath a bold title:
//!
//! ```text
//! Catalog info
//! ├ 4 components over 2 sources
//! └ Total flux density: 3 Jy
//! ```

use std::{
    borrow::Cow,
    sync::{Mutex, MutexGuard},
};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// The first line of the last block gets a corner; every other first line
/// gets a tee. Continuation lines get a vertical bar.
fn tree_symbol(i_line: usize, num_lines: usize, last_block: bool) -> char {
    match (i_line, num_lines, last_block) {
        (0, 1, true) => UP_AND_RIGHT,
        (0, _, _) => VERTICAL_AND_RIGHT,
        _ => VERTICAL,
    }
}

fn draw(level: Level, title: &str, blocks: &[Block]) {
    log::log!(level, "{}", console::style(title).bold());
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        for (i_line, line) in block.iter().enumerate() {
            let symbol = tree_symbol(i_line, block.len(), i_block + 1 == num_blocks);
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        draw(Level::Info, &self.title, &self.blocks);
    }
}

fn warnings() -> MutexGuard<'static, Vec<Block>> {
    // A poisoned lock still holds perfectly usable strings.
    WARNINGS.lock().unwrap_or_else(|e| e.into_inner())
}

/// Things that can be deferred as warnings, to be shown all at once by
/// [`display_warnings`].
pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for Block {
    fn warn(self) {
        warnings().push(self);
    }
}

impl<const N: usize> Warn for [Cow<'static, str>; N] {
    fn warn(self) {
        warnings().push(self.to_vec());
    }
}

/// Print out any warnings that have been collected, and forget them.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let blocks = std::mem::take(&mut *warnings());
    if blocks.is_empty() {
        return;
    }
    draw(Level::Warn, "Warnings", &blocks);
}

#[cfg(test)]
pub(super) fn tree_symbols(blocks: &[usize]) -> Vec<char> {
    let num_blocks = blocks.len();
    blocks
        .iter()
        .enumerate()
        .flat_map(|(i_block, &num_lines)| {
            (0..num_lines).map(move |i_line| tree_symbol(i_line, num_lines, i_block + 1 == num_blocks))
        })
        .collect()
}
