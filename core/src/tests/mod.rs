mod tick_parity;
