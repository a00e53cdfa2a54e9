// Copyright (c) 2026 Peerpool
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use peerpool::core::txpool::{TransactionPool, TxPoolError};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    raw: Vec<u8>,
    resubmit: bool,
}

fuzz_target!(|inp: Input| {
    let mut pool = TransactionPool::default();
    pool.initialize();

    match pool.process_transaction(&inp.raw) {
        Ok(hash) => {
            assert_eq!(pool.get_transaction_pool().len(), 1);
            if inp.resubmit {
                assert!(matches!(
                    pool.process_transaction(&inp.raw),
                    Err(TxPoolError::AlreadyProcessed(_))
                ));
            }
            assert!(pool.mark_transaction_processed(&hash).is_ok());
            assert!(pool.get_transaction(&hash).is_some());
        }
        Err(_) => {
            assert!(pool.get_transaction_pool().is_empty());
            assert!(!pool.last_error().is_empty());
        }
    }
});
