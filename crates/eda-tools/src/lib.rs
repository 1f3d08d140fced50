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

//! Tool-calling façade for LLM runtimes: five named tools over the upload,
//! polling and chart-synthesis stack, with declared JSON input schemas and a
//! uniform outcome envelope. Errors never cross the façade.

pub mod facade;
pub mod schema;
pub mod session;

pub use facade::{EdaToolkit, ToolOutcome};
pub use schema::{tool_specs, ToolSpec};
pub use session::{AnalysisJob, AnalysisSession};
