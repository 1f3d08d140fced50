// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Column selection and chart-data synthesis over backend EDA summaries.
//!
//! No raw rows ever reach this crate: distribution, scatter and density
//! series are synthesised from summary statistics and are explicitly
//! labelled as approximations.

pub mod chart_type;
pub mod selector;
pub mod synth;

pub use chart_type::ChartType;
pub use selector::{select_columns, ColumnSelection, QualityBucket, RankedColumn};
pub use synth::{ChartParams, ChartPoint, ChartSeries, SynthPolicy, SynthRegistry, Synthesizer};
