//! Cursor automaton over the posts x media grid.
//!
//! The pager is the only writer of the cursor. Buttons map to raw moves which
//! are then normalised with wraparound, so the cursor always points at a real
//! attachment once `apply` returns.

use serde::{Deserialize, Serialize};

use crate::error::EmptyFeedError;

/// Raw button read from the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub d: bool,
    /// False when the read did not follow a real edge.
    pub changed: bool,
}

impl ButtonState {
    /// An edge with exactly one button held.
    pub fn pressed(button: Button) -> Self {
        let mut state = Self {
            changed: true,
            ..Self::default()
        };
        match button {
            Button::PrevPost => state.a = true,
            Button::NextPost => state.b = true,
            Button::PrevImage => state.c = true,
            Button::NextImage => state.d = true,
        }
        state
    }

    /// An edge where every button is up again.
    pub fn released() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    /// Held flags in `Button::ALL` order.
    pub fn held(self) -> [bool; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// Navigation meaning of the four buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    PrevPost,
    NextPost,
    PrevImage,
    NextImage,
}

impl Button {
    /// Buttons in priority order.
    pub const ALL: [Button; 4] = [
        Button::PrevPost,
        Button::NextPost,
        Button::PrevImage,
        Button::NextImage,
    ];

    /// Picks the button that acts for a panel read.
    ///
    /// Stale reads and releases yield `None`. When several buttons are down the
    /// highest priority one wins: a > b > c > d.
    pub fn from_state(state: ButtonState) -> Option<Self> {
        if !state.changed {
            return None;
        }
        state
            .held()
            .into_iter()
            .zip(Self::ALL)
            .find_map(|(down, button)| down.then_some(button))
    }
}

/// What happens when navigation steps before the first post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeforeFirst {
    /// Jump to the last post.
    #[default]
    Wrap,
    /// Stay on the first post.
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub post: usize,
    pub media: usize,
}

impl Cursor {
    pub const fn new(post: usize, media: usize) -> Self {
        Self { post, media }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.post, self.media)
    }
}

#[derive(Debug, Clone)]
pub struct Pager {
    cursor: Cursor,
    media_counts: Vec<usize>,
    before_first: BeforeFirst,
}

impl Pager {
    /// Starts a pager at `(0, 0)`.
    ///
    /// Every entry of `media_counts` must be at least 1; `Session` guarantees this.
    ///
    /// # Errors
    /// Returns `EmptyFeedError` when there are no posts.
    pub fn new(
        media_counts: Vec<usize>,
        before_first: BeforeFirst,
    ) -> Result<Self, EmptyFeedError> {
        if media_counts.is_empty() {
            return Err(EmptyFeedError);
        }
        debug_assert!(media_counts.iter().all(|&count| count > 0));
        Ok(Self {
            cursor: Cursor::default(),
            media_counts,
            before_first,
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn post_count(&self) -> usize {
        self.media_counts.len()
    }

    pub fn before_first(&self) -> BeforeFirst {
        self.before_first
    }

    /// Swaps in a freshly fetched grid and returns to `(0, 0)`.
    ///
    /// # Errors
    /// Returns `EmptyFeedError` when there are no posts; the old grid is kept.
    pub fn reset(&mut self, media_counts: Vec<usize>) -> Result<(), EmptyFeedError> {
        if media_counts.is_empty() {
            return Err(EmptyFeedError);
        }
        debug_assert!(media_counts.iter().all(|&count| count > 0));
        self.media_counts = media_counts;
        self.cursor = Cursor::default();
        Ok(())
    }

    /// Applies one button press.
    ///
    /// Returns the new cursor if it moved, `None` if the press was a no-op.
    pub fn apply(&mut self, button: Button) -> Option<Cursor> {
        let mut post = self.cursor.post as isize;
        let mut media = self.cursor.media as isize;

        match button {
            Button::PrevPost => {
                post -= 1;
                media = 0;
            }
            Button::NextPost => {
                post += 1;
                media = 0;
            }
            Button::PrevImage => {
                if media > 0 {
                    media -= 1;
                }
            }
            Button::NextImage => media += 1,
        }

        // Media lookups below need a valid post.
        post = self.wrap_post(post);

        if media < 0 {
            post = self.wrap_post(post - 1);
            media = self.media_count(post) - 1;
        } else if media >= self.media_count(post) {
            media = 0;
            post = self.wrap_post(post + 1);
        }

        let next = Cursor::new(post as usize, media as usize);
        debug_assert!(self.is_valid(next), "cursor {next} escaped the grid");

        if next == self.cursor {
            return None;
        }
        self.cursor = next;
        Some(next)
    }

    /// Whether `cursor` points at a real attachment.
    pub fn is_valid(&self, cursor: Cursor) -> bool {
        self.media_counts
            .get(cursor.post)
            .is_some_and(|&count| cursor.media < count)
    }

    fn wrap_post(&self, post: isize) -> isize {
        let count = self.media_counts.len() as isize;
        if post < 0 {
            match self.before_first {
                BeforeFirst::Wrap => count - 1,
                BeforeFirst::Clamp => 0,
            }
        } else if post >= count {
            0
        } else {
            post
        }
    }

    fn media_count(&self, post: isize) -> isize {
        self.media_counts[post as usize] as isize
    }
}
