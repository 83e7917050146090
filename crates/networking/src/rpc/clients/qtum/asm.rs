//! Parser for the contract outputs Qtum adds to Bitcoin script.
//!
//! `decoderawtransaction` renders them as space separated ASM:
//!
//! ```text
//! <vm version> <gas limit> <gas price> <bytecode> OP_CREATE
//! <vm version> <gas limit> <gas price> <call data> <contract address> OP_CALL
//! ```

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AsmError {
    #[error("invalid {0} ASM: expected at least {1} parts")]
    TooShort(&'static str, usize),
    #[error("unknown contract opcode in ASM: {0}")]
    UnknownOpcode(String),
    #[error("invalid number in ASM: {0}")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractCreation {
    pub vm_version: String,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub bytecode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub vm_version: String,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub call_data: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Asm {
    Create(ContractCreation),
    Call(ContractCall),
}

impl Asm {
    pub fn parse(asm: &str) -> Result<Self, AsmError> {
        let parts: Vec<&str> = asm.split_whitespace().collect();
        match parts.last().copied() {
            Some("OP_CREATE") => Self::parse_create(&parts).map(Asm::Create),
            Some("OP_CALL") => Self::parse_call(&parts).map(Asm::Call),
            other => Err(AsmError::UnknownOpcode(other.unwrap_or_default().to_owned())),
        }
    }

    fn parse_create(parts: &[&str]) -> Result<ContractCreation, AsmError> {
        if parts.len() < 5 {
            return Err(AsmError::TooShort("create", 5));
        }
        Ok(ContractCreation {
            vm_version: parts[0].to_owned(),
            gas_limit: parse_number(parts[1])?,
            gas_price: parse_number(parts[2])?,
            bytecode: parts[3].to_owned(),
        })
    }

    fn parse_call(parts: &[&str]) -> Result<ContractCall, AsmError> {
        if parts.len() < 6 {
            return Err(AsmError::TooShort("call", 6));
        }
        Ok(ContractCall {
            vm_version: parts[0].to_owned(),
            gas_limit: parse_number(parts[1])?,
            gas_price: parse_number(parts[2])?,
            call_data: parts[3].to_owned(),
            contract_address: parts[4].to_owned(),
        })
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Asm::Create(create) => create.gas_limit,
            Asm::Call(call) => call.gas_limit,
        }
    }

    pub fn gas_price(&self) -> u64 {
        match self {
            Asm::Create(create) => create.gas_price,
            Asm::Call(call) => call.gas_price,
        }
    }

    /// Bytecode for a creation, call data for a call.
    pub fn input(&self) -> &str {
        match self {
            Asm::Create(create) => &create.bytecode,
            Asm::Call(call) => &call.call_data,
        }
    }
}

fn parse_number(value: &str) -> Result<u64, AsmError> {
    value
        .parse()
        .map_err(|_| AsmError::InvalidNumber(value.to_owned()))
}
