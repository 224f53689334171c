// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_basic;
mod test_bidi;
mod test_container;
mod utils;
