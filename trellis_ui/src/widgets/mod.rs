// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete leaf and content widgets.

mod border;
mod button;
mod content;
mod rectangle;
mod slider;
mod text_block;

pub use border::Border;
pub use button::Button;
pub use content::ContentControl;
pub use rectangle::Rectangle;
pub use slider::Slider;
pub use text_block::TextBlock;
