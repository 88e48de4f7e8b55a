//! Operand stack

use crate::error::{Fault, VmResult};
use crate::gas::cost::MAX_STACK_SIZE;
use primitive_types::U256;

/// Per-frame LIFO of 256-bit words, at most 1024 deep
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<U256>,
}

impl Stack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MAX_STACK_SIZE),
        }
    }

    /// Check an instruction's stack requirements before it runs.
    ///
    /// `required` items must be present and the height after applying `change`
    /// must stay within the limit.
    pub fn require(&self, required: usize, change: isize) -> VmResult<()> {
        let len = self.data.len();
        if len < required {
            return Err(Fault::StackUnderflow);
        }
        if change > 0 && len + change as usize > MAX_STACK_SIZE {
            return Err(Fault::StackOverflow);
        }
        Ok(())
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: U256) -> VmResult<()> {
        if self.data.len() >= MAX_STACK_SIZE {
            return Err(Fault::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> VmResult<U256> {
        self.data.pop().ok_or(Fault::StackUnderflow)
    }

    /// Pop `N` values, top first
    pub fn pop_n<const N: usize>(&mut self) -> VmResult<[U256; N]> {
        if self.data.len() < N {
            return Err(Fault::StackUnderflow);
        }
        let mut out = [U256::zero(); N];
        for slot in out.iter_mut() {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek(&self, depth: usize) -> VmResult<&U256> {
        if depth >= self.data.len() {
            return Err(Fault::StackUnderflow);
        }
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Duplicate item at position to top (1 = dup top)
    pub fn dup(&mut self, position: usize) -> VmResult<()> {
        if position == 0 || position > self.data.len() {
            return Err(Fault::StackUnderflow);
        }
        let value = self.data[self.data.len() - position];
        self.push(value)
    }

    /// Swap top with item at depth (1 = swap with second item)
    pub fn swap(&mut self, depth: usize) -> VmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth >= len {
            return Err(Fault::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_stack_push_pop() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        stack.push(w(2)).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), w(2));
        assert_eq!(stack.pop().unwrap(), w(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_stack_underflow() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
    }

    #[test]
    fn test_stack_overflow() {
        let mut stack = Stack::new();
        for i in 0..MAX_STACK_SIZE {
            stack.push(w(i as u64)).unwrap();
        }
        assert_eq!(stack.push(w(0)), Err(Fault::StackOverflow));
    }

    #[test]
    fn test_stack_pop_n_order() {
        let mut stack = Stack::new();
        for v in 1..=3 {
            stack.push(w(v)).unwrap();
        }
        let [a, b] = stack.pop_n::<2>().unwrap();
        assert_eq!((a, b), (w(3), w(2)));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop_n::<2>(), Err(Fault::StackUnderflow));
        // Nothing popped on failure
        assert_eq!(stack.len(), 1);
    }

    // ==================== Requirement checks ====================

    #[test]
    fn test_require_underflow() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        assert_eq!(stack.require(2, -1), Err(Fault::StackUnderflow));
        assert_eq!(stack.require(1, 0), Ok(()));
    }

    #[test]
    fn test_require_overflow() {
        let mut stack = Stack::new();
        for _ in 0..MAX_STACK_SIZE {
            stack.push(w(0)).unwrap();
        }
        assert_eq!(stack.require(0, 1), Err(Fault::StackOverflow));
        assert_eq!(stack.require(2, -1), Ok(()));
        assert_eq!(stack.require(16, 0), Ok(()));
    }

    // ==================== Dup / Swap ====================

    #[test]
    fn test_stack_dup() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        stack.push(w(2)).unwrap();
        stack.dup(2).unwrap();
        assert_eq!(*stack.peek(0).unwrap(), w(1));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.dup(4), Err(Fault::StackUnderflow));
        assert_eq!(stack.dup(0), Err(Fault::StackUnderflow));
    }

    #[test]
    fn test_stack_swap() {
        let mut stack = Stack::new();
        for v in 1..=3 {
            stack.push(w(v)).unwrap();
        }
        stack.swap(2).unwrap();
        assert_eq!(*stack.peek(0).unwrap(), w(1));
        assert_eq!(*stack.peek(1).unwrap(), w(2));
        assert_eq!(*stack.peek(2).unwrap(), w(3));
        assert_eq!(stack.peek(3), Err(Fault::StackUnderflow));
        assert_eq!(stack.swap(3), Err(Fault::StackUnderflow));
        assert_eq!(stack.swap(0), Err(Fault::StackUnderflow));
    }

    #[test]
    fn test_swap_empty_stack() {
        let mut stack = Stack::new();
        assert_eq!(stack.swap(1), Err(Fault::StackUnderflow));
    }
}
