// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for invoice totals and action dispatch.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Subtotal and tax computation over growing catalogs
//! - Quantity edits through the store, which recompute totals
//! - Full selection cycles (open, toggle, commit)

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use invoice_creator::{
    Action, CatalogItem, InvoiceState, InvoiceTotals, LineItem, LineItemEdit, LineItemId, Money,
    SALES_TAX_RATE, Store,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn make_catalog(count: usize) -> Vec<CatalogItem> {
    (0..count)
        .map(|i| CatalogItem {
            id: LineItemId::from(i.to_string()),
            item: format!("Item {i}"),
            details: String::new(),
            price: Money::from_cents(100 + (i as i64 * 37) % 10_000),
            is_taxable: i % 3 != 0,
            in_stock: 50,
        })
        .collect()
}

/// Catalog with every other item selected at a small quantity.
fn make_selected_line_items(count: usize) -> Vec<LineItem> {
    make_catalog(count)
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let mut line_item = LineItem::from(item);
            line_item.selected = i % 2 == 0;
            line_item.selected_draft = line_item.selected;
            line_item.quantity = (i % 7) as u32 + 1;
            line_item
        })
        .collect()
}

fn make_store(count: usize) -> Store {
    let mut store = Store::new(SALES_TAX_RATE);
    store
        .dispatch(Action::PopulateCatalog {
            items: make_catalog(count),
        })
        .unwrap();
    store
}

// =============================================================================
// Totals Benchmarks
// =============================================================================

fn bench_totals_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("totals_compute");

    for count in [100, 1_000, 10_000].iter() {
        let line_items = make_selected_line_items(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &line_items, |b, items| {
            b.iter(|| InvoiceTotals::compute(black_box(items), SALES_TAX_RATE).unwrap())
        });
    }
    group.finish();
}

fn bench_tax_rounding(c: &mut Criterion) {
    c.bench_function("tax_round_half_up", |b| {
        let amount = Money::from_cents(1_234_567);
        b.iter(|| black_box(amount).apply_rate(black_box(SALES_TAX_RATE)).unwrap())
    });
}

// =============================================================================
// Dispatch Benchmarks
// =============================================================================

fn bench_quantity_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantity_edit");

    for count in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut store = make_store(count);
            let mut quantity = 0u32;
            b.iter(|| {
                quantity = (quantity + 1) % 100;
                let edit = LineItemEdit::new("0").with_quantity(f64::from(quantity));
                store.dispatch(black_box(Action::edit(edit))).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_selection_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_cycle");

    for count in [100, 1_000].iter() {
        let populated = InvoiceState::new().transition(Action::PopulateCatalog {
            items: make_catalog(*count),
        });
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &populated, |b, state| {
            b.iter(|| {
                let mut state = state.clone().transition(Action::OpenSelectionModal);
                for i in (0..state.catalog.len()).step_by(2) {
                    state = state.transition(Action::edit(
                        LineItemEdit::new(i.to_string()).with_selected_draft(true),
                    ));
                }
                black_box(state.transition(Action::CommitSelectionDraft))
            })
        });
    }
    group.finish();
}

criterion_group!(totals, bench_totals_compute, bench_tax_rounding);

criterion_group!(dispatch, bench_quantity_edit, bench_selection_cycle);

criterion_main!(totals, dispatch);
